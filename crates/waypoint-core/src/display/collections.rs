//! Collection wrapper types for displaying groups of domain objects.

use std::{fmt, ops::Index};

use crate::models::User;

/// Newtype wrapper for displaying a list of users as a compact table.
///
/// # Examples
///
/// ```rust
/// use jiff::Timestamp;
/// use waypoint_core::{display::Users, models::User};
///
/// let mut user = User::new(42, Timestamp::UNIX_EPOCH);
/// user.access = true;
///
/// let output = Users(vec![user]).to_string();
/// assert!(output.contains("| 42 |"));
/// ```
pub struct Users(pub Vec<User>);

impl Users {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, User> {
        self.0.iter()
    }
}

impl Index<usize> for Users {
    type Output = User;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for Users {
    type Item = User;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Users {
    type Item = &'a User;
    type IntoIter = std::slice::Iter<'a, User>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn flag(set: bool) -> &'static str {
    if set {
        "yes"
    } else {
        "no"
    }
}

impl fmt::Display for Users {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No users found.");
        }

        writeln!(f, "| ID | Access | Admin | Plan | Dialog | Last active |")?;
        writeln!(f, "|---:|:---:|:---:|:---:|---|---|")?;
        for user in &self.0 {
            writeln!(
                f,
                "| {} | {} | {} | {} | {} | {} |",
                user.id,
                flag(user.access),
                flag(user.is_admin),
                flag(user.has_plan()),
                user.dialog_state,
                user.last_active_at.strftime("%Y-%m-%d %H:%M UTC"),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;

    #[test]
    fn test_users_display_empty() {
        assert_eq!(Users(vec![]).to_string(), "No users found.\n");
    }

    #[test]
    fn test_users_display_rows() {
        let at = Timestamp::from_second(1_704_067_200).unwrap();
        let mut admin = User::new(1, at);
        admin.is_admin = true;
        let guest = User::new(2, at);

        let output = Users(vec![admin, guest]).to_string();
        assert!(output.contains("| 1 | no | yes | no | idle | 2024-01-01 00:00 UTC |"));
        assert!(output.contains("| 2 | no | no | no | idle |"));
        assert_eq!(output.lines().count(), 4);
    }
}
