use std::fmt;

/// The sixteen segments of the walker skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BodyPartName {
    Hips,
    Chest,
    Spine,
    Head,
    ThighL,
    ShinL,
    FootL,
    ThighR,
    ShinR,
    FootR,
    ArmL,
    ForearmL,
    HandL,
    ArmR,
    ForearmR,
    HandR,
}

impl BodyPartName {
    /// Registration order. Observations follow this order.
    pub const ALL: [BodyPartName; 16] = [
        BodyPartName::Hips,
        BodyPartName::Chest,
        BodyPartName::Spine,
        BodyPartName::Head,
        BodyPartName::ThighL,
        BodyPartName::ShinL,
        BodyPartName::FootL,
        BodyPartName::ThighR,
        BodyPartName::ShinR,
        BodyPartName::FootR,
        BodyPartName::ArmL,
        BodyPartName::ForearmL,
        BodyPartName::HandL,
        BodyPartName::ArmR,
        BodyPartName::ForearmR,
        BodyPartName::HandR,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BodyPartName::Hips => "hips",
            BodyPartName::Chest => "chest",
            BodyPartName::Spine => "spine",
            BodyPartName::Head => "head",
            BodyPartName::ThighL => "thighL",
            BodyPartName::ShinL => "shinL",
            BodyPartName::FootL => "footL",
            BodyPartName::ThighR => "thighR",
            BodyPartName::ShinR => "shinR",
            BodyPartName::FootR => "footR",
            BodyPartName::ArmL => "armL",
            BodyPartName::ForearmL => "forearmL",
            BodyPartName::HandL => "handL",
            BodyPartName::ArmR => "armR",
            BodyPartName::ForearmR => "forearmR",
            BodyPartName::HandR => "handR",
        }
    }

    /// Segment this one hangs from. The hips are the root of the skeleton.
    pub fn parent(self) -> Option<BodyPartName> {
        use BodyPartName::*;
        match self {
            Hips => None,
            Spine | ThighL | ThighR => Some(Hips),
            Chest => Some(Spine),
            Head | ArmL | ArmR => Some(Chest),
            ShinL => Some(ThighL),
            ShinR => Some(ThighR),
            FootL => Some(ShinL),
            FootR => Some(ShinR),
            ForearmL => Some(ArmL),
            ForearmR => Some(ArmR),
            HandL => Some(ForearmL),
            HandR => Some(ForearmR),
        }
    }

    /// Number of actuated rotation axes. Zero for parts the policy never drives.
    pub fn degrees_of_freedom(self) -> usize {
        use BodyPartName::*;
        match self {
            Hips | HandL | HandR => 0,
            Chest | Spine | FootL | FootR => 3,
            ThighL | ThighR | ArmL | ArmR | Head => 2,
            ShinL | ShinR | ForearmL | ForearmR => 1,
        }
    }

    /// Whether the policy drives this part. Driven parts also report their
    /// local rotation and strength in observations.
    pub fn is_actuated(self) -> bool {
        self.degrees_of_freedom() > 0
    }
}

impl fmt::Display for BodyPartName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
