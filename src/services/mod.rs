pub mod local_tree;
pub mod webdav;
