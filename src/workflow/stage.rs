/// The five steps of the salary workflow, in tab order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Upload,
    Visualize,
    Train,
    Predict,
    Insights,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 5] = [
        PipelineStage::Upload,
        PipelineStage::Visualize,
        PipelineStage::Train,
        PipelineStage::Predict,
        PipelineStage::Insights,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Upload => "Upload",
            Self::Visualize => "Visualize",
            Self::Train => "Train",
            Self::Predict => "Predict",
            Self::Insights => "Insights",
        }
    }
}

/// Prerequisites that unlock stages.
///
/// `has_trained_model` implies `has_dataset`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GateFlags {
    pub has_dataset: bool,
    pub has_trained_model: bool,
}

impl GateFlags {
    /// Whether `stage` may be entered with these flags.
    pub fn allows(self, stage: PipelineStage) -> bool {
        match stage {
            PipelineStage::Upload => true,
            PipelineStage::Visualize | PipelineStage::Train | PipelineStage::Insights => {
                self.has_dataset
            }
            PipelineStage::Predict => self.has_trained_model,
        }
    }
}
