//! Role checks derived from a user's permission list.
//!
//! Each check is a plain membership test: it passes when the permission list
//! contains at least one of the permissions that grant it.

pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
pub const ROLE_ADMIN_SISTEMA: &str = "ROLE_ADMIN_SISTEMA";
pub const ROLE_ADMIN_USUARIOS: &str = "ROLE_ADMIN_USUARIOS";
pub const ROLE_ADMIN_VETERINARIA: &str = "ROLE_ADMIN_VETERINARIA";
pub const ROLE_VETERINARIO: &str = "ROLE_VETERINARIO";
pub const ROLE_VETERINARIO_SENIOR: &str = "ROLE_VETERINARIO_SENIOR";
pub const ROLE_VETERINARIO_JUNIOR: &str = "ROLE_VETERINARIO_JUNIOR";
pub const ROLE_GERENTE: &str = "ROLE_GERENTE";
pub const ROLE_RECEPCIONISTA: &str = "ROLE_RECEPCIONISTA";
pub const ROLE_ASISTENTE: &str = "ROLE_ASISTENTE";
pub const ROLE_CONSULTOR_DATOS: &str = "ROLE_CONSULTOR_DATOS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleCheck {
    /// Any kind of administrator
    Admin,
    AdminSistema,
    /// User administration, also granted by system admin
    AdminUsuarios,
    /// Clinic administration, also granted by system admin
    AdminVeterinaria,
    /// Veterinarian of any seniority
    Veterinario,
    Gerente,
    Recepcionista,
    Asistente,
    ConsultorDatos,
}

impl RoleCheck {
    pub const ALL: [RoleCheck; 9] = [
        RoleCheck::Admin,
        RoleCheck::AdminSistema,
        RoleCheck::AdminUsuarios,
        RoleCheck::AdminVeterinaria,
        RoleCheck::Veterinario,
        RoleCheck::Gerente,
        RoleCheck::Recepcionista,
        RoleCheck::Asistente,
        RoleCheck::ConsultorDatos,
    ];

    /// Name used in CLI and JSON output
    pub fn name(self) -> &'static str {
        match self {
            RoleCheck::Admin => "isAdmin",
            RoleCheck::AdminSistema => "isAdminSistema",
            RoleCheck::AdminUsuarios => "isAdminUsuarios",
            RoleCheck::AdminVeterinaria => "isAdminVeterinaria",
            RoleCheck::Veterinario => "isVeterinario",
            RoleCheck::Gerente => "isGerente",
            RoleCheck::Recepcionista => "isRecepcionista",
            RoleCheck::Asistente => "isAsistente",
            RoleCheck::ConsultorDatos => "isConsultorDatos",
        }
    }

    /// Permissions any one of which satisfies the check
    pub fn granted_by(self) -> &'static [&'static str] {
        match self {
            RoleCheck::Admin => &[
                ROLE_ADMIN,
                ROLE_ADMIN_SISTEMA,
                ROLE_ADMIN_USUARIOS,
                ROLE_ADMIN_VETERINARIA,
            ],
            RoleCheck::AdminSistema => &[ROLE_ADMIN_SISTEMA],
            RoleCheck::AdminUsuarios => &[ROLE_ADMIN_USUARIOS, ROLE_ADMIN_SISTEMA],
            RoleCheck::AdminVeterinaria => &[ROLE_ADMIN_VETERINARIA, ROLE_ADMIN_SISTEMA],
            RoleCheck::Veterinario => &[
                ROLE_VETERINARIO,
                ROLE_VETERINARIO_SENIOR,
                ROLE_VETERINARIO_JUNIOR,
            ],
            RoleCheck::Gerente => &[ROLE_GERENTE],
            RoleCheck::Recepcionista => &[ROLE_RECEPCIONISTA],
            RoleCheck::Asistente => &[ROLE_ASISTENTE],
            RoleCheck::ConsultorDatos => &[ROLE_CONSULTOR_DATOS],
        }
    }

    pub fn is_satisfied_by<S: AsRef<str>>(self, permissions: &[S]) -> bool {
        let granted = self.granted_by();
        permissions
            .iter()
            .any(|p| granted.iter().any(|g| *g == p.as_ref()))
    }
}
