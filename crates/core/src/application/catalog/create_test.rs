//! Unit tests for create-queue validation

use super::*;

fn request() -> CreateQueueRequest {
    CreateQueueRequest {
        name: "Main Street Bakery".to_string(),
        category: Some("Food".to_string()),
        max_capacity: 20,
        est_time_to_serve: 5,
        ..Default::default()
    }
}

#[test]
fn test_validate_name_empty() {
    let req = CreateQueueRequest {
        name: "   ".to_string(),
        ..request()
    };

    let result = validate_request(&req);
    assert!(result.unwrap_err().to_string().contains("empty"));
}

#[test]
fn test_validate_name_too_long() {
    let req = CreateQueueRequest {
        name: "a".repeat(101),
        ..request()
    };

    let result = validate_request(&req);
    assert!(result.unwrap_err().to_string().contains("too long"));
}

#[test]
fn test_validate_name_at_limit() {
    let req = CreateQueueRequest {
        name: "é".repeat(100),
        ..request()
    };
    assert!(validate_request(&req).is_ok());
}

#[test]
fn test_validate_capacity_must_be_positive() {
    let req = CreateQueueRequest {
        max_capacity: 0,
        ..request()
    };

    let result = validate_request(&req);
    assert!(result.unwrap_err().to_string().contains("maxCapacity"));
}

#[test]
fn test_validate_service_time_must_be_positive() {
    let req = CreateQueueRequest {
        est_time_to_serve: -3,
        ..request()
    };

    let result = validate_request(&req);
    assert!(result.unwrap_err().to_string().contains("estTimeToServe"));
}

#[test]
fn test_validate_notify_position() {
    let req = CreateQueueRequest {
        notify_position: Some(0),
        ..request()
    };
    assert!(validate_request(&req).is_err());

    let req = CreateQueueRequest {
        notify_position: Some(3),
        ..request()
    };
    assert!(validate_request(&req).is_ok());
}

#[test]
fn test_validate_long_description() {
    let req = CreateQueueRequest {
        description: Some("x".repeat(501)),
        ..request()
    };

    let result = validate_request(&req);
    assert!(result.unwrap_err().to_string().contains("description"));
}

#[test]
fn test_request_deserializes_camel_case() {
    let req: CreateQueueRequest = serde_json::from_str(
        r#"{"name":"Clinic","category":"Health","maxCapacity":10,"estTimeToServe":15,"notifyPosition":3}"#,
    )
    .unwrap();
    assert_eq!(req.max_capacity, 10);
    assert_eq!(req.est_time_to_serve, 15);
    assert_eq!(req.notify_position, Some(3));
    assert!(req.location.is_none());
}

#[test]
fn test_request_accepts_snake_case() {
    let req: CreateQueueRequest = serde_json::from_str(
        r#"{"name":"Clinic","max_capacity":10,"est_time_to_serve":15,"opening_time":"09:00"}"#,
    )
    .unwrap();
    assert_eq!(req.max_capacity, 10);
    assert_eq!(req.opening_time.as_deref(), Some("09:00"));
}
