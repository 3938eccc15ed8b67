/// Identifier for a control point in a [`crate::builder::VineMeshBuilder`].
///
/// This is an index into the control point list and, multiplied by the
/// loop resolution, the first vertex slot of the matching ring. It is only
/// meaningful within the lifetime of a given builder.
pub type ControlPointId = usize;

/// One triangle of the vine mesh, as three indices into the vertex buffer.
pub type Triangle = [u32; 3];
