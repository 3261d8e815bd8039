pub mod controller;
pub mod news;
pub mod view;
