//! Mesh buffers, quad emission and atlas UV mapping

pub mod builder;
pub mod uv;
pub mod obj;

pub use builder::{MeshBuffers, MeshBuilder};
pub use uv::{UvMapper, UvMode, UvRect};
pub use obj::ObjWriter;
