//! Account, profile and role types shared by the browser bundle and the server.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Password reset links stop working this long after they are mailed.
pub const RESET_LINK_EXPIRATION_MIN: i64 = 60;

/// Error when a string isn't one of a fixed set of values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} \"{value}\"")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Mentor,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Student, Role::Mentor];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Mentor => "mentor",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Mentor => "Mentor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownValue {
                kind: "role",
                value: s.to_string(),
            })
    }
}

/// School grades served by the application, in order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Grade {
    K1,
    G2,
    G3,
    G4,
    G5,
}

impl Grade {
    pub const ALL: [Grade; 5] = [Grade::K1, Grade::G2, Grade::G3, Grade::G4, Grade::G5];

    /// Stored and submitted form.
    pub fn code(self) -> &'static str {
        match self {
            Grade::K1 => "K1",
            Grade::G2 => "G2",
            Grade::G3 => "G3",
            Grade::G4 => "G4",
            Grade::G5 => "G5",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::K1 => "K1",
            Grade::G2 => "Grade 2",
            Grade::G3 => "Grade 3",
            Grade::G4 => "Grade 4",
            Grade::G5 => "Grade 5",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Grade {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grade::ALL
            .into_iter()
            .find(|grade| grade.code() == s)
            .ok_or_else(|| UnknownValue {
                kind: "grade",
                value: s.to_string(),
            })
    }
}

/// Institutions a mentor can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Institution {
    SekolahKebangsaanMathMentor,
    TadikaUniversitiMalaysiaSabah,
    Others,
}

impl Institution {
    pub const ALL: [Institution; 3] = [
        Institution::SekolahKebangsaanMathMentor,
        Institution::TadikaUniversitiMalaysiaSabah,
        Institution::Others,
    ];

    /// The stored value, which is also what users see.
    pub fn name(self) -> &'static str {
        match self {
            Institution::SekolahKebangsaanMathMentor => "Sekolah Kebangsaan Math Mentor",
            Institution::TadikaUniversitiMalaysiaSabah => "Tadika Universiti Malaysia Sabah",
            Institution::Others => "Others",
        }
    }
}

impl fmt::Display for Institution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Institution {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Institution::ALL
            .into_iter()
            .find(|institution| institution.name() == s)
            .ok_or_else(|| UnknownValue {
                kind: "institution",
                value: s.to_string(),
            })
    }
}

/// Role together with the one role-specific field that goes with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Membership {
    Student { grade: Grade },
    Mentor { institution: Institution },
}

impl Membership {
    pub fn role(self) -> Role {
        match self {
            Membership::Student { .. } => Role::Student,
            Membership::Mentor { .. } => Role::Mentor,
        }
    }

    /// Split into the (grade, institution) column pair, exactly one of which is set.
    pub fn columns(self) -> (Option<Grade>, Option<Institution>) {
        match self {
            Membership::Student { grade } => (Some(grade), None),
            Membership::Mentor { institution } => (None, Some(institution)),
        }
    }
}

/// Proof of an authenticated user, as seen by the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub is_authenticated: bool,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_authenticated: true,
        }
    }
}

/// Application-level user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub grade: Option<Grade>,
    pub institution: Option<Institution>,
    pub profile_completed: bool,
}

impl Profile {
    /// The tagged role data, if the field the role calls for is present.
    pub fn membership(&self) -> Option<Membership> {
        match self.role {
            Role::Student => self.grade.map(|grade| Membership::Student { grade }),
            Role::Mentor => self
                .institution
                .map(|institution| Membership::Mentor { institution }),
        }
    }
}

/// Profile fields chosen at sign-up or on the profile setup screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDetails {
    pub name: String,
    pub membership: Membership,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grades_are_ordered() {
        let mut shuffled = vec![Grade::G4, Grade::K1, Grade::G5, Grade::G2, Grade::G3];
        shuffled.sort();
        assert_eq!(shuffled, Grade::ALL.to_vec());
    }

    #[test]
    fn fixed_sets_parse_their_own_values() {
        for grade in Grade::ALL {
            assert_eq!(grade.code().parse::<Grade>(), Ok(grade));
        }
        for institution in Institution::ALL {
            assert_eq!(institution.name().parse::<Institution>(), Ok(institution));
        }
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert!("G6".parse::<Grade>().is_err());
        assert!("Grade 2".parse::<Grade>().is_err());
        assert!("others".parse::<Institution>().is_err());
        let err = "admin".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "unknown role \"admin\"");
    }

    #[test]
    fn membership_follows_role() {
        let mut profile = Profile {
            id: "a".into(),
            name: "Aisyah".into(),
            role: Role::Student,
            grade: Some(Grade::G3),
            institution: Some(Institution::Others),
            profile_completed: true,
        };
        assert_eq!(
            profile.membership(),
            Some(Membership::Student { grade: Grade::G3 })
        );

        profile.role = Role::Mentor;
        assert_eq!(
            profile.membership(),
            Some(Membership::Mentor {
                institution: Institution::Others
            })
        );

        profile.institution = None;
        assert_eq!(profile.membership(), None);
    }

    #[test]
    fn membership_columns_set_exactly_one_field() {
        let (grade, institution) = Membership::Student { grade: Grade::K1 }.columns();
        assert_eq!((grade, institution), (Some(Grade::K1), None));
        let (grade, institution) = Membership::Mentor {
            institution: Institution::TadikaUniversitiMalaysiaSabah,
        }
        .columns();
        assert_eq!(
            (grade, institution),
            (None, Some(Institution::TadikaUniversitiMalaysiaSabah))
        );
    }
}
