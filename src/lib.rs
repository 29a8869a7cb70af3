pub mod config;
pub mod events;
pub mod gallery;
pub mod geometry;
pub mod lightbox;
pub mod page;
pub mod product;
pub mod replay;
pub mod tasks {
    pub mod lightbox;
    pub mod loader;
}
