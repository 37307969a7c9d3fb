use std::path::Path;
use std::sync::Arc;

/// Font database shared by SVG and text rasterization.
pub type FontDb = Arc<usvg::fontdb::Database>;

/// An empty database; enough to parse and draw SVGs without `<text>`.
pub fn empty_fontdb() -> FontDb {
    Arc::new(usvg::fontdb::Database::new())
}

/// System fonts plus every `.ttf`/`.otf`/`.ttc` file found directly in `extra_dirs`.
#[tracing::instrument(skip(extra_dirs))]
pub fn system_fontdb<P: AsRef<Path>>(extra_dirs: &[P]) -> FontDb {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();

    for dir in extra_dirs {
        load_fonts_from_dir(&mut db, dir.as_ref());
    }

    tracing::debug!(faces = db.len(), "font database ready");
    Arc::new(db)
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory not readable, skipping");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(err) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), %err, "failed to load font file");
        }
    }
}
