// SPDX-License-Identifier: Apache-2.0

use rsia_kpi_client::{BatchBuilder, ClientError};
use rsia_kpi_core::KpiValidationError;
use rsia_kpi_model::{EncodedEvidence, MasterIndicator, ModelError};

fn master() -> Vec<MasterIndicator> {
    let mut attendance =
        MasterIndicator::new("Alice", "Attendance", "95%").with_placement("Medis", "IGD");
    attendance.performance_area = "Pelayanan".to_string();
    attendance.unit_of_measure = "%".to_string();
    vec![
        attendance,
        MasterIndicator::new("Alice", "Visits", "Fluktuatif").with_placement("Medis", "IGD"),
        MasterIndicator::new("Bob", "Sales", "10").with_placement("Umum", "Kasir"),
    ]
}

fn png() -> EncodedEvidence {
    EncodedEvidence::from_base64("bukti.png", "image/png", "iVBORw0KGgo=").expect("png")
}

#[test]
fn builds_batch_with_master_placement_and_row_fields() {
    let master = master();
    let mut builder = BatchBuilder::for_employee(&master, "Alice").expect("employee");
    assert_eq!(builder.assigned().len(), 2);
    builder
        .add("Attendance", "97%", png())
        .expect("attendance")
        .add_with_target("Visits", "12", "14", png())
        .expect("visits")
        .sign(&png())
        .expect("signature");

    let batch = builder.build().expect("batch");
    assert_eq!(batch.employee_name(), "Alice");
    assert_eq!(batch.division(), "Medis");
    assert_eq!(batch.unit(), "IGD");
    assert_eq!(batch.len(), 2);
    let first = &batch.entries()[0];
    assert_eq!(first.performance_area().as_deref(), Some("Pelayanan"));
    assert_eq!(first.unit_of_measure().as_deref(), Some("%"));
    assert_eq!(first.fields()["nama"], "Alice");
}

#[test]
fn unknown_employee_is_refused_up_front() {
    let master = master();
    let err = BatchBuilder::for_employee(&master, "Carol").expect_err("unknown");
    assert!(matches!(err, ClientError::UnknownEmployee(ref name) if name == "Carol"));
}

#[test]
fn indicators_of_other_employees_are_unknown() {
    let master = master();
    let mut builder = BatchBuilder::for_employee(&master, "Alice").expect("employee");
    let err = builder.add("Sales", "3", png()).expect_err("not assigned");
    assert!(matches!(
        err,
        ClientError::Validation(KpiValidationError::UnknownIndicator { .. })
    ));
}

#[test]
fn same_indicator_twice_is_a_duplicate() {
    let master = master();
    let mut builder = BatchBuilder::for_employee(&master, "Alice").expect("employee");
    builder.add("Attendance", "97%", png()).expect("first");
    let err = builder.add("Attendance", "98%", png()).expect_err("duplicate");
    assert!(matches!(
        err,
        ClientError::Model(ModelError::DuplicateIndicator { .. })
    ));
    assert_eq!(builder.entries().len(), 1);
}

#[test]
fn fixed_target_cannot_be_overridden() {
    let master = master();
    let mut builder = BatchBuilder::for_employee(&master, "Alice").expect("employee");
    builder
        .add_with_target("Attendance", "90%", "97%", png())
        .expect("added")
        .sign(&png())
        .expect("signature");
    let err = builder.build().expect_err("immutable target");
    assert!(matches!(
        err,
        ClientError::Validation(KpiValidationError::TargetImmutable { .. })
    ));
}

#[test]
fn unsigned_batch_does_not_build() {
    let master = master();
    let mut builder = BatchBuilder::for_employee(&master, "Alice").expect("employee");
    builder.add("Attendance", "97%", png()).expect("added");
    let err = builder.build().expect_err("unsigned");
    assert!(matches!(err, ClientError::Model(ModelError::MissingSignature)));
    assert_eq!(err.exit_code(), rsia_kpi_core::ExitCode::Validation);
}
