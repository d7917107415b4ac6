pub mod board;
pub mod game;
pub mod move_tree;
pub mod rules;
