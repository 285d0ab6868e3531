//! Wavefront OBJ export of finished meshes

use std::io::{self, Write};

use glam::Vec3;

use crate::mesh::builder::MeshBuffers;

/// Streams meshes as OBJ objects, keeping the 1-based vertex numbering
/// running across objects.
pub struct ObjWriter<W: Write> {
    out: W,
    vertex_base: usize,
}

impl<W: Write> ObjWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, vertex_base: 1 }
    }

    /// Write `mesh` as object `name`, moving every vertex by `offset`
    pub fn write_mesh(&mut self, name: &str, mesh: &MeshBuffers, offset: Vec3) -> io::Result<()> {
        writeln!(self.out, "o {}", name)?;
        for p in &mesh.positions {
            let p = *p + offset;
            writeln!(self.out, "v {} {} {}", p.x, p.y, p.z)?;
        }
        for uv in &mesh.uvs {
            writeln!(self.out, "vt {} {}", uv.x, uv.y)?;
        }
        for n in &mesh.normals {
            writeln!(self.out, "vn {} {} {}", n.x, n.y, n.z)?;
        }
        for tri in mesh.indices.chunks_exact(3) {
            let a = tri[0] as usize + self.vertex_base;
            let b = tri[1] as usize + self.vertex_base;
            let c = tri[2] as usize + self.vertex_base;
            writeln!(self.out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
        }
        self.vertex_base += mesh.vertex_count();
        Ok(())
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
