/// A path string split into its directory and file name parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParts {
    pub original_path: String,
    pub file_name: String,
    pub dir_name: String,
}

impl PathParts {
    /// Split `path` on its last `/`. An empty directory part resolves to `/`.
    pub fn new(path: &str) -> Self {
        let (dir, file) = match path.rfind('/') {
            Some(idx) => (&path[..idx], &path[idx + 1..]),
            None => ("", path),
        };

        Self {
            original_path: path.to_string(),
            file_name: file.to_string(),
            dir_name: if dir.is_empty() { "/" } else { dir }.to_string(),
        }
    }

    /// Rebuild a path from the parts as `dir_name/file_name`
    pub fn joined(&self) -> String {
        format!("{}/{}", self.dir_name, self.file_name)
    }
}

/// Match a file name against a listing mask where `%` stands for any run of characters
pub fn mask_matches(mask: &str, name: &str) -> bool {
    let segments: Vec<&str> = mask.split('%').collect();
    if segments.len() == 1 {
        return mask == name;
    }

    let first = segments[0];
    let last = segments[segments.len() - 1];
    if !name.starts_with(first) || name.len() < first.len() + last.len() {
        return false;
    }

    let mut rest = &name[first.len()..];
    for segment in &segments[1..segments.len() - 1] {
        match rest.find(segment) {
            Some(idx) => rest = &rest[idx + segment.len()..],
            None => return false,
        }
    }

    rest.ends_with(last)
}
