pub mod cart_pipeline;
