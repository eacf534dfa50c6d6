use std::fs;
use std::path::Path;

use ignore::WalkBuilder;

use crate::error::FormError;

pub fn read_text(path: &Path) -> Result<String, FormError> {
  fs::read_to_string(path).map_err(|e| FormError::io(path, e))
}

pub fn write_text(path: &Path, contents: &str) -> Result<(), FormError> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent).map_err(|e| FormError::io(parent, e))?;
  }
  fs::write(path, contents).map_err(|e| FormError::io(path, e))
}

/// Names of the `.html` files directly inside `dir`, sorted.
/// Hidden files and anything matched by a `.gitignore` in `dir` are skipped.
pub fn list_source_files(dir: &Path) -> Result<Vec<String>, FormError> {
  if !dir.is_dir() {
    return Err(FormError::NotFound(format!(
      "source directory {}",
      dir.display()
    )));
  }

  let walker = WalkBuilder::new(dir)
    .max_depth(Some(1))
    .require_git(false)
    .build();

  let mut names = Vec::new();
  for entry in walker {
    let ent = match entry {
      Ok(e) => e,
      Err(_) => continue,
    };
    if ent.depth() == 0 || !ent.file_type().is_some_and(|t| t.is_file()) {
      continue;
    }
    let name = ent.file_name().to_string_lossy().to_string();
    if name.ends_with(".html") {
      names.push(name);
    }
  }
  names.sort();
  Ok(names)
}
