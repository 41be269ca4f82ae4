//! UI components for Workshop Forms

pub mod block_renderer;
pub mod markup_blocks;
pub mod name_prompt;
pub mod workshop_list;
pub mod workshop_view;
