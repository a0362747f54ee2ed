pub mod excerpt;
