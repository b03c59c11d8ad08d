pub mod expectations;
pub mod scene;
pub mod shaders;

pub use expectations::{check_bindings, BindingExpectation};
pub use scene::{build_main_scene, FilterScene};
