use props_core::{Matrix3, PropsError, Value};

#[test]
fn accessors_match_variants() {
    assert_eq!(Value::from(2.5).as_scalar().unwrap(), 2.5);
    assert_eq!(Value::from(vec![1.0, 2.0]).as_vector().unwrap(), &[1.0, 2.0]);
    let tensor = Matrix3::identity();
    assert_eq!(Value::from(tensor).as_tensor().unwrap(), &tensor);
}

#[test]
fn wrong_shape_reports_both_kinds() {
    let err = Value::from(1.0).as_tensor().unwrap_err();
    match err {
        PropsError::Graph(info) => {
            assert_eq!(info.code, "type-mismatch");
            assert_eq!(info.context["expected"], "tensor");
            assert_eq!(info.context["found"], "scalar");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn value_json_is_tagged() {
    let json = serde_json::to_value(Value::Scalar(0.5)).unwrap();
    assert_eq!(json["kind"], "scalar");
    assert_eq!(json["data"], 0.5);
}
