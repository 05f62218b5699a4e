use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Identifier of an analysis mode. Doubles as the path segment of the
/// classifier endpoint (`/predict/{mode}`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
    EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ModeId {
    Driving,
    Art,
    Shopping,
    Food,
    Wiring,
}

impl ModeId {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub fn mode(self) -> &'static Mode {
        match self {
            ModeId::Driving => &MODES[0],
            ModeId::Art => &MODES[1],
            ModeId::Shopping => &MODES[2],
            ModeId::Food => &MODES[3],
            ModeId::Wiring => &MODES[4],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mode {
    pub id: ModeId,
    pub name: &'static str,
    pub description: &'static str,
}

static MODES: [Mode; 5] = [
    Mode {
        id: ModeId::Driving,
        name: "Driving Mode",
        description: "Road and traffic analysis",
    },
    Mode {
        id: ModeId::Art,
        name: "Art Mode",
        description: "Artistic content recognition",
    },
    Mode {
        id: ModeId::Shopping,
        name: "Shopping Mode",
        description: "Product identification",
    },
    Mode {
        id: ModeId::Food,
        name: "Food Mode",
        description: "Food safety analysis",
    },
    Mode {
        id: ModeId::Wiring,
        name: "Wiring & Diagnosis Mode",
        description: "Technical diagnostics",
    },
];

/// Static catalogue of the analysis modes offered to the user.
pub struct ModeRegistry;

impl ModeRegistry {
    pub fn list_modes() -> &'static [Mode] {
        &MODES
    }

    pub fn find_mode(id: &str) -> Option<&'static Mode> {
        MODES.iter().find(|mode| mode.id.as_str() == id)
    }
}
