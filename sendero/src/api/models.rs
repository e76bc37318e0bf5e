use std::fmt;

use serde::{Deserialize, Serialize};

use crate::extract::{Json, Path};
use crate::get;

/// The models `/models/{model_name}` accepts. Anything else is rejected
/// with a 422 before the handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelName {
    #[serde(rename = "alexnet")]
    AlexNet,
    #[serde(rename = "restnet")]
    ResNet,
    #[serde(rename = "lenet")]
    LeNet,
}

impl ModelName {
    pub const ALL: [ModelName; 3] = [ModelName::AlexNet, ModelName::ResNet, ModelName::LeNet];

    /// The literal accepted on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelName::AlexNet => "alexnet",
            ModelName::ResNet => "restnet",
            ModelName::LeNet => "lenet",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ModelName::AlexNet => "Deep Learning FTW!",
            ModelName::LeNet => "LeCNN all images",
            ModelName::ResNet => "Have some residuals",
        }
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub struct ModelPath {
    pub model_name: ModelName,
}

#[derive(Debug, Serialize)]
pub struct ModelMessage {
    pub model_name: ModelName,
    pub message: &'static str,
}

#[get("/models/{model_name}")]
pub async fn get_model(path: Path<ModelPath>) -> Json<ModelMessage> {
    let model_name = path.model_name;
    Json(ModelMessage {
        model_name,
        message: model_name.message(),
    })
}
