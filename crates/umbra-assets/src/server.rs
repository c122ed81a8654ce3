use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::ParseError;
use crate::handle::{AssetHandle, AssetId};
use crate::obj::{self, ObjData};

/// Asset registry. Loads OBJ files once per resolved path and hands out
/// handles to the parsed data.
pub struct AssetServer {
    base_path: PathBuf,
    next_id: AssetId,
    objs: HashMap<AssetId, ObjData>,
    path_to_obj: HashMap<PathBuf, AssetHandle<ObjData>>,
}

impl AssetServer {
    /// Create a new AssetServer rooted at the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        info!("AssetServer created with base path: {}", base_path.display());
        Self {
            base_path,
            next_id: 1,
            objs: HashMap::new(),
            path_to_obj: HashMap::new(),
        }
    }

    /// Resolve a relative asset path against the base path.
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    fn allocate_id(&mut self) -> AssetId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Load and parse an OBJ file.
    /// Subsequent loads of the same path return the cached handle.
    pub fn load_obj(&mut self, path: &Path) -> Result<AssetHandle<ObjData>, ParseError> {
        self.load(path).map(|(handle, _)| handle)
    }

    /// Like [`AssetServer::load_obj`], returning the parsed data directly.
    pub fn load_obj_data(&mut self, path: &Path) -> Result<&ObjData, ParseError> {
        self.load(path).map(|(_, data)| data)
    }

    fn load(&mut self, path: &Path) -> Result<(AssetHandle<ObjData>, &ObjData), ParseError> {
        let full_path = self.resolve(path);

        let cached = self
            .path_to_obj
            .get(&full_path)
            .copied()
            .filter(|handle| self.objs.contains_key(&handle.id()));

        let handle = match cached {
            Some(handle) => {
                debug!("OBJ cache hit: {}", full_path.display());
                handle
            }
            None => {
                let data = obj::load_obj(&full_path)?;
                let handle = AssetHandle::new(self.allocate_id());
                self.objs.insert(handle.id(), data);
                self.path_to_obj.insert(full_path, handle);
                handle
            }
        };

        Ok((handle, &self.objs[&handle.id()]))
    }

    /// Get the parsed data behind a handle.
    pub fn get_obj(&self, handle: AssetHandle<ObjData>) -> Option<&ObjData> {
        self.objs.get(&handle.id())
    }

    /// Check if a handle refers to a loaded asset.
    pub fn is_loaded(&self, handle: AssetHandle<ObjData>) -> bool {
        self.objs.contains_key(&handle.id())
    }

    /// Drop a cached file. A later load of the same path reads it again.
    pub fn unload(&mut self, handle: AssetHandle<ObjData>) -> Option<ObjData> {
        self.path_to_obj.retain(|_, cached| *cached != handle);
        self.objs.remove(&handle.id())
    }

    /// Number of cached files.
    pub fn len(&self) -> usize {
        self.objs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objs.is_empty()
    }

    /// The base path this server resolves relative paths against.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("umbra-assets-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn missing_file_returns_not_found() {
        let mut server = AssetServer::new("/nonexistent");
        match server.load_obj(Path::new("does_not_exist.obj")).unwrap_err() {
            ParseError::NotFound(path) => {
                assert_eq!(path, PathBuf::from("/nonexistent/does_not_exist.obj"))
            }
            other => panic!("expected NotFound, got: {:?}", other),
        }
        assert!(server.is_empty());
    }

    #[test]
    fn resolve_absolute_path() {
        let server = AssetServer::new("/home/user/assets");
        assert_eq!(
            server.resolve(Path::new("/absolute/teapot.obj")),
            PathBuf::from("/absolute/teapot.obj")
        );
    }

    #[test]
    fn resolve_relative_path() {
        let server = AssetServer::new("/home/user/assets");
        assert_eq!(
            server.resolve(Path::new("models/teapot.obj")),
            PathBuf::from("/home/user/assets/models/teapot.obj")
        );
    }

    #[test]
    fn repeated_load_returns_cached_handle() {
        let dir = temp_dir("cache");
        fs::write(dir.join("tri.obj"), "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").expect("write OBJ");

        let mut server = AssetServer::new(&dir);
        let first = server.load_obj(Path::new("tri.obj")).expect("first load");
        let second = server.load_obj(&dir.join("tri.obj")).expect("second load");
        let _ = fs::remove_dir_all(&dir);

        assert_eq!(first, second);
        assert_eq!(server.len(), 1);
        assert_eq!(server.get_obj(first).map(|o| o.indices.len()), Some(3));
    }

    #[test]
    fn unload_forgets_the_path() {
        let dir = temp_dir("unload");
        fs::write(dir.join("tri.obj"), "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").expect("write OBJ");

        let mut server = AssetServer::new(&dir);
        let first = server.load_obj(Path::new("tri.obj")).expect("first load");
        assert!(server.unload(first).is_some());
        assert!(!server.is_loaded(first));

        let again = server.load_obj(Path::new("tri.obj")).expect("reload");
        let _ = fs::remove_dir_all(&dir);

        assert_ne!(first, again);
        assert!(server.is_loaded(again));
    }

    #[test]
    fn parse_errors_are_not_cached() {
        let dir = temp_dir("bad");
        fs::write(dir.join("bad.obj"), "v 1 2").expect("write OBJ");

        let mut server = AssetServer::new(&dir);
        let result = server.load_obj(Path::new("bad.obj"));
        let _ = fs::remove_dir_all(&dir);

        assert!(matches!(result, Err(ParseError::Truncated { .. })));
        assert!(server.is_empty());
    }
}
