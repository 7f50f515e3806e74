use std::fmt;

pub const ROLE_COUNT: usize = 10;

/// The ten roles in rank order. Points descend from Raja down to Thief,
/// and each role's cyclic successor is the one role it can correctly catch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Raja,
    Rani,
    Pm,
    Cm,
    Dcm,
    Minister,
    Mp,
    Mla,
    Police,
    Thief,
}

impl Role {
    pub fn in_order() -> [Role; ROLE_COUNT] {
        [
            Role::Raja,
            Role::Rani,
            Role::Pm,
            Role::Cm,
            Role::Dcm,
            Role::Minister,
            Role::Mp,
            Role::Mla,
            Role::Police,
            Role::Thief,
        ]
    }

    pub fn points(self) -> u64 {
        match self {
            Role::Raja => 10_000,
            Role::Rani => 9_000,
            Role::Pm => 8_000,
            Role::Cm => 7_000,
            Role::Dcm => 6_000,
            Role::Minister => 5_000,
            Role::Mp => 3_500,
            Role::Mla => 2_000,
            Role::Police => 1_000,
            Role::Thief => 0,
        }
    }

    /// Cyclic successor, Raja -> Rani -> ... -> Thief -> Raja.
    pub fn next(self) -> Role {
        match self {
            Role::Raja => Role::Rani,
            Role::Rani => Role::Pm,
            Role::Pm => Role::Cm,
            Role::Cm => Role::Dcm,
            Role::Dcm => Role::Minister,
            Role::Minister => Role::Mp,
            Role::Mp => Role::Mla,
            Role::Mla => Role::Police,
            Role::Police => Role::Thief,
            Role::Thief => Role::Raja,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Role::Raja => write!(f, "Raja"),
            Role::Rani => write!(f, "Rani"),
            Role::Pm => write!(f, "PM"),
            Role::Cm => write!(f, "CM"),
            Role::Dcm => write!(f, "D-CM"),
            Role::Minister => write!(f, "Minister"),
            Role::Mp => write!(f, "MP"),
            Role::Mla => write!(f, "MLA"),
            Role::Police => write!(f, "Police"),
            Role::Thief => write!(f, "Thief"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successor_cycle_is_total() {
        let mut role = Role::Raja;
        let mut seen = Vec::new();
        for _ in 0..ROLE_COUNT {
            seen.push(role);
            role = role.next();
        }
        assert_eq!(role, Role::Raja);
        assert_eq!(seen, Role::in_order());
    }

    #[test]
    fn points_strictly_descend_to_zero() {
        let order = Role::in_order();
        for pair in order.windows(2) {
            assert!(pair[0].points() > pair[1].points());
        }
        assert_eq!(Role::Thief.points(), 0);
    }

    #[test]
    fn labels_keep_their_hyphenated_forms() {
        assert_eq!(Role::Pm.to_string(), "PM");
        assert_eq!(Role::Dcm.to_string(), "D-CM");
        assert_eq!(Role::Mla.to_string(), "MLA");
    }
}
