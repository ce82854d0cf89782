#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Manager = 1,
    Employee = 2,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Manager),
            2 => Some(Role::Employee),
            _ => None,
        }
    }

    /// Role name as used in registration payloads and the `profiles.role` column.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "manager" => Some(Role::Manager),
            "employee" => Some(Role::Employee),
            _ => None,
        }
    }

    pub fn as_name(self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }

    pub fn as_id(self) -> u8 {
        self as u8
    }
}
