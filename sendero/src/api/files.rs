use serde::{Deserialize, Serialize};

use crate::extract::{Json, Path};
use crate::get;

#[derive(Debug, Deserialize, Serialize)]
pub struct FilePath {
    pub file_path: String,
}

/// Echoes everything after `/files/`, slashes included, so
/// `/files//home/johndoe/myfile.txt` yields `/home/johndoe/myfile.txt`.
#[get("/files/{file_path:path}")]
pub async fn read_file(path: Path<FilePath>) -> Json<FilePath> {
    Json(path.into_inner())
}
