// ╔════════════════════════════╗
// ║        Diagnose            ║
// ╚════════════════════════════╝

#[derive(Debug)]
pub struct DiagnoseInput {
    /// Raw bearer token; absence is reported by the session step.
    pub access_token: Option<String>,
}

// ╔════════════════════════════╗
// ║         Repair             ║
// ╚════════════════════════════╝

#[derive(Debug)]
pub struct RepairInput {
    pub access_token: Option<String>,
}
