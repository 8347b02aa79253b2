pub mod dashboard;
pub mod metadata;
pub mod playlist;
pub mod resource;
pub mod spec_merge;
