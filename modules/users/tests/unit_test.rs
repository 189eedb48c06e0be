use users::{NewUser, RepoError, User};

#[test]
fn debug_output_hides_passwords() {
    let user = User {
        id: 3,
        login: "carol".into(),
        password: "s3cret".into(),
    };
    let rendered = format!("{user:?} {:?}", NewUser::new("dave", "hunter2"));
    assert!(rendered.contains("carol"));
    assert!(rendered.contains("dave"));
    assert!(!rendered.contains("s3cret"));
    assert!(!rendered.contains("hunter2"));
}

#[test]
fn with_credentials_keeps_the_id() {
    let user = User {
        id: 42,
        login: "old".into(),
        password: "old".into(),
    };
    let updated = user.with_credentials("new", "pw");
    assert_eq!(updated.id, 42);
    assert_eq!(updated.login, "new");
    assert_eq!(updated.password, "pw");
}

#[test]
fn error_messages_are_descriptive() {
    assert_eq!(
        RepoError::transient("database is locked").to_string(),
        "Transient store failure: database is locked"
    );
    assert_eq!(
        RepoError::constraint_violation("UNIQUE constraint failed: users.login").to_string(),
        "Constraint violation: UNIQUE constraint failed: users.login"
    );
    assert_eq!(
        RepoError::database("no such table: users").to_string(),
        "Database error: no such table: users"
    );
    assert!(RepoError::transient("x").is_transient());
    assert!(!RepoError::multiple_results("x").is_transient());
}
