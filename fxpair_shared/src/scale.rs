use serde::{Deserialize, Serialize};

/// Number of strings on the catalogued guitar.
pub const STRING_COUNT: u8 = 6;

/// Highest root fret that still fits a whole box below the 12th fret.
pub const MAX_ROOT_FRET: u8 = 9;

/// Scale boxes playable in one hand position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoxShape {
    /// Two notes per string: the root fret plus +3 on strings 1, 5, 6 and +2 on 2, 3, 4.
    #[default]
    MinorPentatonic,
}

impl BoxShape {
    /// Fret offsets above the root fret, indexed by `string - 1`.
    pub fn get_offsets(&self) -> &'static [[u8; 2]; STRING_COUNT as usize] {
        match self {
            BoxShape::MinorPentatonic => &[[0, 3], [0, 2], [0, 2], [0, 2], [0, 3], [0, 3]],
        }
    }

    /// Whether `(string, fret)` lies inside the box rooted at `root_fret`.
    /// Strings are numbered from 1; anything outside 1..=6 is never in the box.
    pub fn contains(&self, string: u8, fret: u8, root_fret: u8) -> bool {
        if string == 0 || string > STRING_COUNT {
            return false;
        }
        self.get_offsets()[(string - 1) as usize]
            .iter()
            .any(|&offset| root_fret.checked_add(offset) == Some(fret))
    }

    /// Every `(string, fret)` position of the box rooted at `root_fret`.
    pub fn positions(&self, root_fret: u8) -> Vec<(u8, u8)> {
        self.get_offsets()
            .iter()
            .enumerate()
            .flat_map(|(idx, offsets)| {
                offsets
                    .iter()
                    .map(move |&offset| (idx as u8 + 1, root_fret.saturating_add(offset)))
            })
            .collect()
    }
}
