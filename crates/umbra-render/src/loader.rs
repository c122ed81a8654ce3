use std::path::Path;

use tracing::info;
use umbra_assets::{load_obj, ObjData};

use crate::error::MeshError;
use crate::mesh::Mesh;

/// Read an OBJ file and turn it into a mesh ready for upload:
/// parse, normalize, then compute vertex normals.
pub fn load_and_process(path: &Path) -> Result<Mesh, MeshError> {
    let obj = load_obj(path)?;
    let mesh = process_obj(&obj)?;
    info!(
        "Prepared mesh '{}': {} vertices, {} triangles",
        path.display(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Same pipeline as [`load_and_process`] for data that is already parsed.
pub fn process_obj(obj: &ObjData) -> Result<Mesh, MeshError> {
    let mut mesh = Mesh::from_obj(obj)?;
    mesh.process();
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::fs;
    use umbra_assets::ParseError;

    #[test]
    fn missing_file_propagates_not_found() {
        match load_and_process(Path::new("/nonexistent/umbra/hat.obj")) {
            Err(MeshError::Parse(ParseError::NotFound(_))) => {}
            other => panic!("expected NotFound, got: {:?}", other),
        }
    }

    #[test]
    fn loads_normalizes_and_shades_a_quad() {
        let path = std::env::temp_dir().join(format!("umbra-render-quad-{}.obj", std::process::id()));
        fs::write(&path, "v 10 10 0\nv 14 10 0\nv 14 14 0\nv 10 14 0\nf 1 2 3 4\n").expect("write OBJ");

        let mesh = load_and_process(&path);
        let _ = fs::remove_file(&path);
        let mesh = mesh.expect("quad loads");

        assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3]);
        let bounds = mesh.bounds().expect("non-empty");
        assert!(bounds.min.abs_diff_eq(Vec3::new(-1.0, -1.0, 0.0), 1e-5));
        assert!(bounds.max.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-5));
        for v in mesh.vertices() {
            assert!(v.norm().abs_diff_eq(Vec3::Z, 1e-5));
        }
    }

    #[test]
    fn bundled_cube_asset_is_shading_ready() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/cube.obj");
        let mesh = load_and_process(&path).expect("bundled cube loads");

        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);
        let extent = mesh.bounds().expect("non-empty").extent();
        assert!((extent.max_element() - 2.0).abs() < 1e-5);
        for v in mesh.vertices() {
            // Every corner touches three faces, so its normal points outward.
            assert!(v.norm().dot(v.pos()) > 0.0);
        }
    }

    #[test]
    fn hand_built_data_is_still_range_checked() {
        let obj = ObjData {
            positions: vec![[0.0, 0.0, 0.0]],
            indices: vec![0, 0, 5],
        };
        match process_obj(&obj) {
            Err(MeshError::IndexOutOfRange { index, vertex_count }) => {
                assert_eq!(index, 5);
                assert_eq!(vertex_count, 1);
            }
            other => panic!("expected IndexOutOfRange, got: {:?}", other),
        }
    }
}
