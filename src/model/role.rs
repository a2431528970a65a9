use strum::EnumString;

/// Roles carried by the gateway-issued JWT. The user service owns the role
/// assignment; this service only enforces it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Role {
    Manager,
    Employee,
}
