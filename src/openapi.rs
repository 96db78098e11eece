// src/openapi.rs

use crate::models::{
    AssignEmployeeRequest, AuthResponse, CommitPayrollRequest, CreateEmployeeRequest,
    CreatePaystubRequest, CreateVendorRequest, Employee, EmployeePublic, EmployeeStatus, Expense,
    LoginRequest, NewExpenseLine, NewInvoiceLine, NewOverrideLine, Override, PayrollEntry,
    PaystubDetail, PaystubExistsResponse, PaystubSummary, SaleInvoice, UpdateEmployeeRequest,
    Vendor,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Agency Payroll API",
        version = "0.1.0",
        description = "Payroll and invoice management for a marketing agency. \
            Paystubs are derived on the fly from sale invoices, overrides, and \
            expenses sharing an (agent, vendor, issue date) key, with visibility \
            scoped by role: admins see everything, managers see their assigned \
            agents, employees see themselves.",
        license(name = "MIT")
    ),
    paths(
        // Auth
        crate::handlers::auth::login,
        // Employees
        crate::handlers::employee::create_employee,
        crate::handlers::employee::list_employees,
        crate::handlers::employee::get_employee,
        crate::handlers::employee::update_employee,
        crate::handlers::employee::delete_employee,
        crate::handlers::employee::restore_employee,
        crate::handlers::employee::assign_subordinate,
        crate::handlers::employee::unassign_subordinate,
        crate::handlers::employee::list_subordinates,
        // Vendors
        crate::handlers::vendor::create_vendor,
        crate::handlers::vendor::list_vendors,
        crate::handlers::vendor::deactivate_vendor,
        // Paystubs
        crate::handlers::paystub::list_paystubs,
        crate::handlers::paystub::get_paystub_detail,
        crate::handlers::paystub::paystub_exists,
        crate::handlers::ledger::create_paystub,
        // Payroll
        crate::handlers::payroll::commit_payroll,
        crate::handlers::payroll::list_payroll_entries,
        crate::handlers::payroll::mark_entry_paid,
    ),
    components(
        schemas(
            LoginRequest, AuthResponse, EmployeePublic,
            CreateEmployeeRequest, UpdateEmployeeRequest, Employee, EmployeeStatus,
            AssignEmployeeRequest,
            CreateVendorRequest, Vendor,
            SaleInvoice, Override, Expense,
            NewInvoiceLine, NewOverrideLine, NewExpenseLine, CreatePaystubRequest,
            PaystubSummary, PaystubDetail, PaystubExistsResponse,
            CommitPayrollRequest, PayrollEntry,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Employee login"),
        (name = "Employees", description = "Employee records and manager assignments"),
        (name = "Vendors", description = "Vendor records"),
        (name = "Paystubs", description = "Derived paystub listings, detail, and batch entry"),
        (name = "Payroll", description = "Committed payroll snapshots"),
    )
)]
pub struct ApiDoc;
