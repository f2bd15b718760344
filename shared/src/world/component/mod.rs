pub mod animator;
pub mod transform;
