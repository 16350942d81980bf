//! Texture assets: manifest, decoding and the background loader.
//!
//! Images are decoded to RGBA8 on a worker thread; the event loop polls the
//! [`AssetLoader`] while the frame driver is idle and uploads the finished
//! [`AssetSet`] to the GPU in one go.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{Receiver, TryRecvError};
use thiserror::Error;

pub const SHIP_TEXTURE: &str = "ship.png";
pub const BACKGROUND_TEXTURE: &str = "background.png";
pub const FLAME_SPRITESHEET: &str = "flame.png";
pub const PROJECTILE_SPRITESHEET: &str = "projectile.png";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetId {
    Ship,
    Background,
    Flame,
    Projectile,
}

impl AssetId {
    pub const ALL: [AssetId; 4] = [AssetId::Ship, AssetId::Background, AssetId::Flame, AssetId::Projectile];

    pub fn file_name(self) -> &'static str {
        match self {
            AssetId::Ship => SHIP_TEXTURE,
            AssetId::Background => BACKGROUND_TEXTURE,
            AssetId::Flame => FLAME_SPRITESHEET,
            AssetId::Projectile => PROJECTILE_SPRITESHEET,
        }
    }

    /// Frame layout of the image.
    pub fn grid(self) -> FrameGrid {
        match self {
            AssetId::Ship | AssetId::Background => FrameGrid::SINGLE,
            AssetId::Flame => FrameGrid::new(4, 1),
            AssetId::Projectile => FrameGrid::new(4, 1),
        }
    }
}

/// Equal-sized frames laid out row-major in a sprite sheet.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameGrid {
    pub columns: u32,
    pub rows: u32,
}

impl FrameGrid {
    pub const SINGLE: FrameGrid = FrameGrid { columns: 1, rows: 1 };

    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    pub fn frame_count(self) -> u32 {
        self.columns * self.rows
    }

    /// Texture-space `(uv_min, uv_max)` of frame `index`, wrapping past the last frame.
    pub fn uv_rect(self, index: u32) -> ([f32; 2], [f32; 2]) {
        let count = self.frame_count().max(1);
        let index = index % count;
        let col = index % self.columns.max(1);
        let row = index / self.columns.max(1);

        let fw = 1.0 / self.columns.max(1) as f32;
        let fh = 1.0 / self.rows.max(1) as f32;
        let min = [col as f32 * fw, row as f32 * fh];
        ([min[0], min[1]], [min[0] + fw, min[1] + fh])
    }

    /// Pixel size of one frame of a `width × height` sheet.
    pub fn frame_size(self, width: u32, height: u32) -> [u32; 2] {
        [width / self.columns.max(1), height / self.rows.max(1)]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetEntry {
    pub id: AssetId,
    pub path: PathBuf,
    pub grid: FrameGrid,
}

/// The set of images the client needs before it can render a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetManifest {
    entries: Vec<AssetEntry>,
}

impl AssetManifest {
    /// All four textures, looked up by their standard file names under `root`.
    pub fn standard(root: &Path) -> Self {
        let entries = AssetId::ALL
            .into_iter()
            .map(|id| AssetEntry {
                id,
                path: root.join(id.file_name()),
                grid: id.grid(),
            })
            .collect();
        Self { entries }
    }

    pub fn from_entries(entries: Vec<AssetEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[AssetEntry] {
        &self.entries
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{path} has no pixels")]
    Empty { path: PathBuf },

    #[error("{path} is {width}x{height}, not divisible into a {columns}x{rows} frame grid")]
    Grid {
        path: PathBuf,
        width: u32,
        height: u32,
        columns: u32,
        rows: u32,
    },

    #[error("asset {0:?} was not loaded")]
    Missing(AssetId),

    #[error("failed to spawn asset loader thread")]
    Spawn(#[source] std::io::Error),

    #[error("asset loader stopped before finishing")]
    Disconnected,
}

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub id: AssetId,
    pub grid: FrameGrid,
    pub image: DecodedImage,
}

impl LoadedAsset {
    pub fn frame_size(&self) -> [u32; 2] {
        self.grid.frame_size(self.image.width, self.image.height)
    }
}

/// Every image of a manifest, decoded.
#[derive(Debug, Clone, Default)]
pub struct AssetSet {
    assets: HashMap<AssetId, LoadedAsset>,
}

impl AssetSet {
    pub fn get(&self, id: AssetId) -> Result<&LoadedAsset, AssetError> {
        self.assets.get(&id).ok_or(AssetError::Missing(id))
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Reads and decodes one image to RGBA8.
pub fn load_image(path: &Path) -> Result<DecodedImage, AssetError> {
    let bytes = fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let rgba = image::load_from_memory(&bytes)
        .map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();

    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(AssetError::Empty {
            path: path.to_path_buf(),
        });
    }

    Ok(DecodedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

/// Loads every manifest entry in order, reporting progress in percent after each one.
pub fn load_all<F>(manifest: &AssetManifest, mut on_progress: F) -> Result<AssetSet, AssetError>
where
    F: FnMut(u8),
{
    let total = manifest.entries.len();
    let mut assets = HashMap::with_capacity(total);

    for (i, entry) in manifest.entries.iter().enumerate() {
        let image = load_image(&entry.path)?;
        let FrameGrid { columns, rows } = entry.grid;
        if columns == 0 || rows == 0 || image.width % columns != 0 || image.height % rows != 0 {
            return Err(AssetError::Grid {
                path: entry.path.clone(),
                width: image.width,
                height: image.height,
                columns,
                rows,
            });
        }

        log::debug!("decoded {} ({}x{})", entry.path.display(), image.width, image.height);
        assets.insert(
            entry.id,
            LoadedAsset {
                id: entry.id,
                grid: entry.grid,
                image,
            },
        );

        on_progress(((i + 1) * 100 / total) as u8);
    }

    if total == 0 {
        on_progress(100);
    }

    Ok(AssetSet { assets })
}

enum LoadEvent {
    Progress(u8),
    Finished(Result<AssetSet, AssetError>),
}

/// What [`AssetLoader::poll`] observed.
#[derive(Debug)]
pub enum LoadStatus {
    Loading(u8),
    Ready(AssetSet),
    Failed(AssetError),
}

/// Decodes a manifest on a worker thread.
pub struct AssetLoader {
    events: Receiver<LoadEvent>,
    join: Option<thread::JoinHandle<()>>,
    progress: u8,
    done: bool,
}

impl AssetLoader {
    pub fn spawn(manifest: AssetManifest) -> Result<Self, AssetError> {
        let (tx, rx) = crossbeam_channel::unbounded();

        let join = thread::Builder::new()
            .name("superstellar_assets".to_string())
            .spawn(move || {
                let progress_tx = tx.clone();
                let result = load_all(&manifest, |p| {
                    let _ = progress_tx.send(LoadEvent::Progress(p));
                });
                let _ = tx.send(LoadEvent::Finished(result));
            })
            .map_err(AssetError::Spawn)?;

        Ok(Self {
            events: rx,
            join: Some(join),
            progress: 0,
            done: false,
        })
    }

    /// Last reported progress in percent.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Drains pending loader events without blocking.
    ///
    /// Returns `Ready`/`Failed` exactly once; afterwards the loader keeps
    /// reporting `Loading(100)`.
    pub fn poll(&mut self) -> LoadStatus {
        if self.done {
            return LoadStatus::Loading(self.progress);
        }

        loop {
            match self.events.try_recv() {
                Ok(LoadEvent::Progress(p)) => {
                    self.progress = p;
                    log::info!("progress: {p}%");
                }
                Ok(LoadEvent::Finished(result)) => {
                    self.finish();
                    return match result {
                        Ok(set) => LoadStatus::Ready(set),
                        Err(err) => LoadStatus::Failed(err),
                    };
                }
                Err(TryRecvError::Empty) => return LoadStatus::Loading(self.progress),
                Err(TryRecvError::Disconnected) => {
                    self.finish();
                    return LoadStatus::Failed(AssetError::Disconnected);
                }
            }
        }
    }

    fn finish(&mut self) {
        self.done = true;
        self.progress = 100;
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for AssetLoader {
    fn drop(&mut self) {
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    fn write_png(path: &Path, width: u32, height: u32) {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        img.save(path).expect("write png");
    }

    fn write_standard_set(root: &Path) {
        write_png(&root.join(SHIP_TEXTURE), 8, 8);
        write_png(&root.join(BACKGROUND_TEXTURE), 16, 16);
        write_png(&root.join(FLAME_SPRITESHEET), 16, 4);
        write_png(&root.join(PROJECTILE_SPRITESHEET), 8, 2);
    }

    #[test]
    fn frame_grid_uv_rects_cover_the_sheet() {
        let grid = FrameGrid::new(4, 1);
        assert_eq!(grid.uv_rect(0), ([0.0, 0.0], [0.25, 1.0]));
        assert_eq!(grid.uv_rect(3), ([0.75, 0.0], [1.0, 1.0]));
        // Wraps.
        assert_eq!(grid.uv_rect(5), grid.uv_rect(1));
        assert_eq!(grid.frame_size(64, 16), [16, 16]);
    }

    #[test]
    fn load_all_reports_progress_up_to_100() {
        let dir = tempdir().expect("temp dir");
        write_standard_set(dir.path());

        let mut progress = Vec::new();
        let set = load_all(&AssetManifest::standard(dir.path()), |p| progress.push(p)).expect("load");

        assert_eq!(progress, vec![25, 50, 75, 100]);
        assert_eq!(set.len(), 4);
        let flame = set.get(AssetId::Flame).expect("flame");
        assert_eq!(flame.frame_size(), [4, 4]);
        assert_eq!(flame.image.pixels.len(), 16 * 4 * 4);
    }

    #[test]
    fn bundled_assets_load() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
        let set = load_all(&AssetManifest::standard(&root), |_| {}).expect("bundled assets");
        assert_eq!(set.len(), AssetId::ALL.len());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().expect("temp dir");
        let err = load_all(&AssetManifest::standard(dir.path()), |_| {}).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn garbage_file_is_a_decode_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("bad.png");
        fs::write(&path, b"not a png").expect("write");
        assert!(matches!(load_image(&path), Err(AssetError::Decode { .. })));
    }

    #[test]
    fn sheet_not_divisible_by_grid_is_rejected() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("sheet.png");
        write_png(&path, 10, 4);
        let manifest = AssetManifest::from_entries(vec![AssetEntry {
            id: AssetId::Flame,
            path,
            grid: FrameGrid::new(4, 1),
        }]);
        assert!(matches!(load_all(&manifest, |_| {}), Err(AssetError::Grid { .. })));
    }

    #[test]
    fn loader_thread_finishes_with_ready_set() {
        let dir = tempdir().expect("temp dir");
        write_standard_set(dir.path());

        let mut loader = AssetLoader::spawn(AssetManifest::standard(dir.path())).expect("spawn");
        let deadline = Instant::now() + Duration::from_secs(10);
        let set = loop {
            match loader.poll() {
                LoadStatus::Ready(set) => break set,
                LoadStatus::Failed(err) => panic!("load failed: {err}"),
                LoadStatus::Loading(_) => {
                    assert!(Instant::now() < deadline, "loader timed out");
                    thread::sleep(Duration::from_millis(5));
                }
            }
        };

        assert_eq!(set.len(), 4);
        assert_eq!(loader.progress(), 100);
        assert!(matches!(loader.poll(), LoadStatus::Loading(100)));
    }

    #[test]
    fn loader_thread_reports_failure() {
        let dir = tempdir().expect("temp dir");
        let mut loader = AssetLoader::spawn(AssetManifest::standard(dir.path())).expect("spawn");
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            match loader.poll() {
                LoadStatus::Failed(AssetError::Io { .. }) => break,
                LoadStatus::Failed(other) => panic!("unexpected error: {other}"),
                LoadStatus::Ready(_) => panic!("empty dir must not load"),
                LoadStatus::Loading(_) => {
                    assert!(Instant::now() < deadline, "loader timed out");
                    thread::sleep(Duration::from_millis(5));
                }
            }
        }
    }
}
