use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Øvelses-id-er slik de ligger i katalogen på serveren.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i64)]
pub enum CardioType {
    Running = 137,
    Walking = 136,
    Elliptical = 132,
    Cycling = 243,
    Rowing = 135,
    General = 327,
    Stair = 134,
    AmericanFootball = 3000,
    AustralianFootball = 3001,
    Badminton = 3002,
    Basketball = 3003,
    Baseball = 3004,
    Cricket = 3005,
    CrossFit = 3006,
    FitnessClass = 3007,
    Hiking = 3008,
    Hockey = 3009,
    JumpRope = 3010,
    Paddling = 3011,
    Pilates = 3012,
    Rugby = 3013,
    Skiing = 3014,
    Snowboarding = 3015,
    Squash = 3016,
    Softball = 3017,
    Soccer = 3018,
    Tennis = 3019,
    TableTennis = 3020,
    Yoga = 3021,
    Volleyball = 3022,
    Dancing = 3023,
    Swimming = 3024,
    Hiit = 3025,
}

pub const ALL_CARDIO_TYPES: [CardioType; 33] = [
    CardioType::Running,
    CardioType::Walking,
    CardioType::Elliptical,
    CardioType::Cycling,
    CardioType::Rowing,
    CardioType::General,
    CardioType::Stair,
    CardioType::AmericanFootball,
    CardioType::AustralianFootball,
    CardioType::Badminton,
    CardioType::Basketball,
    CardioType::Baseball,
    CardioType::Cricket,
    CardioType::CrossFit,
    CardioType::FitnessClass,
    CardioType::Hiking,
    CardioType::Hockey,
    CardioType::JumpRope,
    CardioType::Paddling,
    CardioType::Pilates,
    CardioType::Rugby,
    CardioType::Skiing,
    CardioType::Snowboarding,
    CardioType::Squash,
    CardioType::Softball,
    CardioType::Soccer,
    CardioType::Tennis,
    CardioType::TableTennis,
    CardioType::Yoga,
    CardioType::Volleyball,
    CardioType::Dancing,
    CardioType::Swimming,
    CardioType::Hiit,
];

impl CardioType {
    pub fn id(self) -> i64 {
        self as i64
    }

    pub fn from_id(id: i64) -> Option<Self> {
        ALL_CARDIO_TYPES.iter().copied().find(|t| t.id() == id)
    }

    /// Distanse-maskinene; alt annet i katalogen er tidsbasert.
    fn is_distance_based(self) -> bool {
        matches!(
            self,
            CardioType::Running
                | CardioType::Walking
                | CardioType::Elliptical
                | CardioType::Cycling
                | CardioType::Rowing
        )
    }
}

static TIME_CARDIO_IDS: Lazy<HashSet<i64>> = Lazy::new(|| {
    ALL_CARDIO_TYPES
        .iter()
        .filter(|t| !t.is_distance_based())
        .map(|t| t.id())
        .collect()
});

/// Tidsbasert cardio (måles i tid, ikke distanse). Egendefinerte øvelser
/// utenfor katalogen er aldri tidsbaserte.
pub fn is_time_cardio(exercise_id: i64) -> bool {
    TIME_CARDIO_IDS.contains(&exercise_id)
}
