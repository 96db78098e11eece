// src/routes/mod.rs

use crate::{
    handlers::{
        auth::login,
        employee::{
            assign_subordinate, create_employee, delete_employee, get_employee, list_employees,
            list_subordinates, restore_employee, unassign_subordinate, update_employee,
        },
        ledger::create_paystub,
        paystub::{get_paystub_detail, list_paystubs, paystub_exists},
        payroll::{commit_payroll, list_payroll_entries, mark_entry_paid},
        vendor::{create_vendor, deactivate_vendor, list_vendors},
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{delete, get, post},
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // ─── Auth ─────────────────────────────────────────────
        .route("/auth/login", post(login))
        // ─── Employees ────────────────────────────────────────
        .route("/employees", post(create_employee).get(list_employees))
        .route(
            "/employees/{employee_id}",
            get(get_employee)
                .patch(update_employee)
                .delete(delete_employee),
        )
        .route("/employees/{employee_id}/restore", post(restore_employee))
        .route(
            "/employees/{employee_id}/assignments",
            post(assign_subordinate).get(list_subordinates),
        )
        .route(
            "/employees/{employee_id}/assignments/{subordinate_id}",
            delete(unassign_subordinate),
        )
        // ─── Vendors ──────────────────────────────────────────
        .route("/vendors", post(create_vendor).get(list_vendors))
        .route("/vendors/{vendor_id}", delete(deactivate_vendor))
        // ─── Paystubs ─────────────────────────────────────────
        .route("/paystubs", get(list_paystubs).post(create_paystub))
        .route("/paystubs/detail", get(get_paystub_detail))
        .route("/paystubs/exists", get(paystub_exists))
        // ─── Payroll ──────────────────────────────────────────
        .route("/payroll/commit", post(commit_payroll))
        .route("/payroll/entries", get(list_payroll_entries))
        .route("/payroll/entries/{entry_id}/pay", post(mark_entry_paid))
}
