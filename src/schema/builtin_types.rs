// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Predefined ROS2 builtin message types.
//!
//! Provides a curated, representative subset of the standard ROS2
//! distribution's message packages so that common bags decode out of the
//! box. Anything not listed here is registered at runtime from the `.msg`
//! or `.idl` text embedded in the source bag (see `schema::registry`).
//!
//! ## Supported packages
//!
//! `builtin_interfaces`, `std_msgs`, `geometry_msgs`, `sensor_msgs`,
//! `diagnostic_msgs`, `nav_msgs`, `tf2_msgs`, `rosgraph_msgs`,
//! `unique_identifier_msgs`, `lifecycle_msgs`, `rcl_interfaces`.

use crate::schema::ast::{Constant, Field, FieldType, MessageType, PrimitiveType};

fn field(name: &str, type_name: FieldType) -> Field {
    Field {
        name: name.to_string(),
        type_name,
    }
}

fn prim(p: PrimitiveType) -> FieldType {
    FieldType::Primitive(p)
}

fn nested(name: &str) -> FieldType {
    FieldType::Nested(name.to_string())
}

fn fixed_array(base: FieldType, size: usize) -> FieldType {
    FieldType::Array {
        base_type: Box::new(base),
        size,
    }
}

fn sequence(base: FieldType) -> FieldType {
    FieldType::Sequence {
        base_type: Box::new(base),
        max: None,
    }
}

fn msg(name: &str, fields: &[(&str, FieldType)]) -> MessageType {
    let mut t = MessageType::new(name.to_string());
    for (n, ty) in fields {
        t.add_field(field(n, ty.clone()));
    }
    t
}

fn builtin_time(name: &str) -> MessageType {
    msg(
        name,
        &[
            ("sec", prim(PrimitiveType::Int32)),
            ("nanosec", prim(PrimitiveType::UInt32)),
        ],
    )
}

fn builtin_duration(name: &str) -> MessageType {
    msg(
        name,
        &[
            ("sec", prim(PrimitiveType::Int32)),
            ("nanosec", prim(PrimitiveType::UInt32)),
        ],
    )
}

/// `std_msgs/msg/Header` — ROS2 form, no `seq` field.
fn builtin_header(name: &str, time_type: &str) -> MessageType {
    msg(
        name,
        &[
            ("stamp", nested(time_type)),
            ("frame_id", prim(PrimitiveType::String)),
        ],
    )
}

fn builtin_string(name: &str) -> MessageType {
    msg(name, &[("data", prim(PrimitiveType::String))])
}

fn builtin_bool(name: &str) -> MessageType {
    msg(name, &[("data", prim(PrimitiveType::Bool))])
}

fn builtin_vector3(name: &str) -> MessageType {
    msg(
        name,
        &[
            ("x", prim(PrimitiveType::Float64)),
            ("y", prim(PrimitiveType::Float64)),
            ("z", prim(PrimitiveType::Float64)),
        ],
    )
}

fn builtin_point(name: &str) -> MessageType {
    msg(
        name,
        &[
            ("x", prim(PrimitiveType::Float64)),
            ("y", prim(PrimitiveType::Float64)),
            ("z", prim(PrimitiveType::Float64)),
        ],
    )
}

fn builtin_quaternion(name: &str) -> MessageType {
    msg(
        name,
        &[
            ("x", prim(PrimitiveType::Float64)),
            ("y", prim(PrimitiveType::Float64)),
            ("z", prim(PrimitiveType::Float64)),
            ("w", prim(PrimitiveType::Float64)),
        ],
    )
}

fn builtin_pose(name: &str, point_type: &str, quat_type: &str) -> MessageType {
    msg(
        name,
        &[
            ("position", nested(point_type)),
            ("orientation", nested(quat_type)),
        ],
    )
}

fn builtin_twist(name: &str, vec3_type: &str) -> MessageType {
    msg(
        name,
        &[
            ("linear", nested(vec3_type)),
            ("angular", nested(vec3_type)),
        ],
    )
}

fn builtin_transform(name: &str, vec3_type: &str, quat_type: &str) -> MessageType {
    msg(
        name,
        &[
            ("translation", nested(vec3_type)),
            ("rotation", nested(quat_type)),
        ],
    )
}

fn builtin_transform_stamped(name: &str, header_type: &str, transform_type: &str) -> MessageType {
    msg(
        name,
        &[
            ("header", nested(header_type)),
            ("child_frame_id", prim(PrimitiveType::String)),
            ("transform", nested(transform_type)),
        ],
    )
}

fn builtin_tf_message(name: &str, transform_stamped_type: &str) -> MessageType {
    msg(
        name,
        &[(
            "transforms",
            sequence(nested(transform_stamped_type)),
        )],
    )
}

fn builtin_pointfield(name: &str) -> MessageType {
    let mut t = msg(
        name,
        &[
            ("name", prim(PrimitiveType::String)),
            ("offset", prim(PrimitiveType::UInt32)),
            ("datatype", prim(PrimitiveType::UInt8)),
            ("count", prim(PrimitiveType::UInt32)),
        ],
    );
    for (cname, val) in [
        ("INT8", "1"),
        ("UINT8", "2"),
        ("INT16", "3"),
        ("UINT16", "4"),
        ("INT32", "5"),
        ("UINT32", "6"),
        ("FLOAT32", "7"),
        ("FLOAT64", "8"),
    ] {
        t.add_constant(Constant {
            type_name: PrimitiveType::UInt8,
            name: cname.to_string(),
            value: val.to_string(),
        });
    }
    t
}

fn builtin_pointcloud2(name: &str, header_type: &str, pointfield_type: &str) -> MessageType {
    msg(
        name,
        &[
            ("header", nested(header_type)),
            ("height", prim(PrimitiveType::UInt32)),
            ("width", prim(PrimitiveType::UInt32)),
            ("fields", sequence(nested(pointfield_type))),
            ("is_bigendian", prim(PrimitiveType::Bool)),
            ("point_step", prim(PrimitiveType::UInt32)),
            ("row_step", prim(PrimitiveType::UInt32)),
            ("data", sequence(prim(PrimitiveType::UInt8))),
            ("is_dense", prim(PrimitiveType::Bool)),
        ],
    )
}

fn builtin_image(name: &str, header_type: &str) -> MessageType {
    msg(
        name,
        &[
            ("header", nested(header_type)),
            ("height", prim(PrimitiveType::UInt32)),
            ("width", prim(PrimitiveType::UInt32)),
            ("encoding", prim(PrimitiveType::String)),
            ("is_bigendian", prim(PrimitiveType::UInt8)),
            ("step", prim(PrimitiveType::UInt32)),
            ("data", sequence(prim(PrimitiveType::UInt8))),
        ],
    )
}

fn builtin_imu(name: &str, header_type: &str, quat_type: &str, vec3_type: &str) -> MessageType {
    msg(
        name,
        &[
            ("header", nested(header_type)),
            ("orientation", nested(quat_type)),
            (
                "orientation_covariance",
                fixed_array(prim(PrimitiveType::Float64), 9),
            ),
            ("angular_velocity", nested(vec3_type)),
            (
                "angular_velocity_covariance",
                fixed_array(prim(PrimitiveType::Float64), 9),
            ),
            ("linear_acceleration", nested(vec3_type)),
            (
                "linear_acceleration_covariance",
                fixed_array(prim(PrimitiveType::Float64), 9),
            ),
        ],
    )
}

fn builtin_diagnostic_status(name: &str, kv_type: &str) -> MessageType {
    let mut t = msg(
        name,
        &[
            ("level", prim(PrimitiveType::Byte)),
            ("name", prim(PrimitiveType::String)),
            ("message", prim(PrimitiveType::String)),
            ("hardware_id", prim(PrimitiveType::String)),
            ("values", sequence(nested(kv_type))),
        ],
    );
    for (cname, val) in [("OK", "0"), ("WARN", "1"), ("ERROR", "2"), ("STALE", "3")] {
        t.add_constant(Constant {
            type_name: PrimitiveType::Byte,
            name: cname.to_string(),
            value: val.to_string(),
        });
    }
    t
}

fn builtin_key_value(name: &str) -> MessageType {
    msg(
        name,
        &[
            ("key", prim(PrimitiveType::String)),
            ("value", prim(PrimitiveType::String)),
        ],
    )
}

fn builtin_diagnostic_array(name: &str, header_type: &str, status_type: &str) -> MessageType {
    msg(
        name,
        &[
            ("header", nested(header_type)),
            ("status", sequence(nested(status_type))),
        ],
    )
}

fn builtin_log(name: &str) -> MessageType {
    let mut t = msg(
        name,
        &[
            ("stamp", nested("builtin_interfaces/msg/Time")),
            ("level", prim(PrimitiveType::UInt8)),
            ("name", prim(PrimitiveType::String)),
            ("msg", prim(PrimitiveType::String)),
            ("file", prim(PrimitiveType::String)),
            ("function", prim(PrimitiveType::String)),
            ("line", prim(PrimitiveType::UInt32)),
        ],
    );
    for (cname, val) in [
        ("DEBUG", "10"),
        ("INFO", "20"),
        ("WARN", "30"),
        ("ERROR", "40"),
        ("FATAL", "50"),
    ] {
        t.add_constant(Constant {
            type_name: PrimitiveType::UInt8,
            name: cname.to_string(),
            value: val.to_string(),
        });
    }
    t
}

fn builtin_clock(name: &str) -> MessageType {
    msg(name, &[("clock", nested("builtin_interfaces/msg/Time"))])
}

fn builtin_uuid(name: &str) -> MessageType {
    msg(
        name,
        &[("uuid", fixed_array(prim(PrimitiveType::UInt8), 16))],
    )
}

fn builtin_odometry(name: &str, header_type: &str, pose_type: &str, twist_type: &str) -> MessageType {
    msg(
        name,
        &[
            ("header", nested(header_type)),
            ("child_frame_id", prim(PrimitiveType::String)),
            (
                "pose",
                nested(&format!("{pose_type}WithCovariance")),
            ),
            (
                "twist",
                nested(&format!("{twist_type}WithCovariance")),
            ),
        ],
    )
}

fn builtin_pose_with_covariance(name: &str, pose_type: &str) -> MessageType {
    msg(
        name,
        &[
            ("pose", nested(pose_type)),
            ("covariance", fixed_array(prim(PrimitiveType::Float64), 36)),
        ],
    )
}

fn builtin_twist_with_covariance(name: &str, twist_type: &str) -> MessageType {
    msg(
        name,
        &[
            ("twist", nested(twist_type)),
            ("covariance", fixed_array(prim(PrimitiveType::Float64), 36)),
        ],
    )
}

/// Get all predefined builtin message types, pre-seeded into the registry.
pub fn get_all() -> Vec<MessageType> {
    vec![
        builtin_time("builtin_interfaces/Time"),
        builtin_time("builtin_interfaces/msg/Time"),
        builtin_duration("builtin_interfaces/Duration"),
        builtin_duration("builtin_interfaces/msg/Duration"),
        builtin_header("std_msgs/Header", "builtin_interfaces/Time"),
        builtin_header("std_msgs/msg/Header", "builtin_interfaces/msg/Time"),
        builtin_string("std_msgs/msg/String"),
        builtin_bool("std_msgs/msg/Bool"),
        msg(
            "std_msgs/msg/Empty",
            &[],
        ),
        builtin_vector3("geometry_msgs/msg/Vector3"),
        builtin_point("geometry_msgs/msg/Point"),
        builtin_quaternion("geometry_msgs/msg/Quaternion"),
        builtin_pose(
            "geometry_msgs/msg/Pose",
            "geometry_msgs/msg/Point",
            "geometry_msgs/msg/Quaternion",
        ),
        builtin_pose_with_covariance(
            "geometry_msgs/msg/PoseWithCovariance",
            "geometry_msgs/msg/Pose",
        ),
        builtin_twist("geometry_msgs/msg/Twist", "geometry_msgs/msg/Vector3"),
        builtin_twist_with_covariance(
            "geometry_msgs/msg/TwistWithCovariance",
            "geometry_msgs/msg/Twist",
        ),
        builtin_transform(
            "geometry_msgs/msg/Transform",
            "geometry_msgs/msg/Vector3",
            "geometry_msgs/msg/Quaternion",
        ),
        builtin_transform_stamped(
            "geometry_msgs/msg/TransformStamped",
            "std_msgs/msg/Header",
            "geometry_msgs/msg/Transform",
        ),
        msg(
            "geometry_msgs/msg/PoseStamped",
            &[
                ("header", nested("std_msgs/msg/Header")),
                ("pose", nested("geometry_msgs/msg/Pose")),
            ],
        ),
        builtin_tf_message("tf2_msgs/msg/TFMessage", "geometry_msgs/msg/TransformStamped"),
        builtin_pointfield("sensor_msgs/msg/PointField"),
        builtin_pointcloud2(
            "sensor_msgs/msg/PointCloud2",
            "std_msgs/msg/Header",
            "sensor_msgs/msg/PointField",
        ),
        builtin_image("sensor_msgs/msg/Image", "std_msgs/msg/Header"),
        builtin_imu(
            "sensor_msgs/msg/Imu",
            "std_msgs/msg/Header",
            "geometry_msgs/msg/Quaternion",
            "geometry_msgs/msg/Vector3",
        ),
        msg(
            "sensor_msgs/msg/JointState",
            &[
                ("header", nested("std_msgs/msg/Header")),
                ("name", sequence(prim(PrimitiveType::String))),
                ("position", sequence(prim(PrimitiveType::Float64))),
                ("velocity", sequence(prim(PrimitiveType::Float64))),
                ("effort", sequence(prim(PrimitiveType::Float64))),
            ],
        ),
        builtin_key_value("diagnostic_msgs/msg/KeyValue"),
        builtin_diagnostic_status(
            "diagnostic_msgs/msg/DiagnosticStatus",
            "diagnostic_msgs/msg/KeyValue",
        ),
        builtin_diagnostic_array(
            "diagnostic_msgs/msg/DiagnosticArray",
            "std_msgs/msg/Header",
            "diagnostic_msgs/msg/DiagnosticStatus",
        ),
        builtin_odometry(
            "nav_msgs/msg/Odometry",
            "std_msgs/msg/Header",
            "geometry_msgs/msg/Pose",
            "geometry_msgs/msg/Twist",
        ),
        builtin_log("rcl_interfaces/msg/Log"),
        builtin_clock("rosgraph_msgs/msg/Clock"),
        builtin_uuid("unique_identifier_msgs/msg/UUID"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_all_unique_names() {
        let all = get_all();
        let mut names: Vec<&str> = all.iter().map(|t| t.name.as_str()).collect();
        let len_before = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), len_before, "duplicate builtin type name");
    }

    #[test]
    fn test_string_message() {
        let all = get_all();
        let string_type = all
            .iter()
            .find(|t| t.name == "std_msgs/msg/String")
            .unwrap();
        assert_eq!(string_type.fields.len(), 1);
        assert_eq!(string_type.fields[0].name, "data");
        assert!(matches!(
            string_type.fields[0].type_name,
            FieldType::Primitive(PrimitiveType::String)
        ));
    }

    #[test]
    fn test_point_message() {
        let all = get_all();
        let point = all
            .iter()
            .find(|t| t.name == "geometry_msgs/msg/Point")
            .unwrap();
        assert_eq!(point.fields.len(), 3);
        for f in &point.fields {
            assert!(matches!(
                f.type_name,
                FieldType::Primitive(PrimitiveType::Float64)
            ));
        }
    }

    #[test]
    fn test_header_has_no_seq() {
        let all = get_all();
        let header = all
            .iter()
            .find(|t| t.name == "std_msgs/msg/Header")
            .unwrap();
        assert!(header.fields.iter().all(|f| f.name != "seq"));
        assert_eq!(header.fields[0].name, "stamp");
        assert_eq!(header.fields[1].name, "frame_id");
    }

    #[test]
    fn test_diagnostic_status_constants() {
        let all = get_all();
        let status = all
            .iter()
            .find(|t| t.name == "diagnostic_msgs/msg/DiagnosticStatus")
            .unwrap();
        assert_eq!(status.constants.len(), 4);
    }
}
