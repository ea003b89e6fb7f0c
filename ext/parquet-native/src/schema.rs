//! Schema model: logical types, nodes, column paths and descriptors

use std::os::raw::c_char;
use std::sync::Arc;

use parquet::basic::LogicalType;
use parquet::schema::types::{
    ColumnDescPtr, ColumnPath, SchemaDescPtr, SchemaDescriptor, Type, TypePtr,
};
use parquet_native_core::error::check_index;
use parquet_native_core::{CoreError, Result};

use crate::enums;
use crate::error::{ffi_catch, ErrorInfo};
use crate::handles;
use crate::strings;

pub struct LogicalTypeHandle(pub(crate) LogicalType);
pub struct NodeHandle(pub(crate) TypePtr);
pub struct ColumnPathHandle(pub(crate) ColumnPath);
pub struct SchemaDescriptorHandle(pub(crate) SchemaDescPtr);
pub struct ColumnDescriptorHandle(pub(crate) ColumnDescPtr);

// ---------------------------------------------------------------------
// Logical types
// ---------------------------------------------------------------------

macro_rules! simple_logical_type {
    ($export:ident, $variant:expr) => {
        /// # Safety
        ///
        /// `logical_type` must be a valid out-pointer.
        #[no_mangle]
        pub unsafe extern "C" fn $export(
            logical_type: *mut *mut LogicalTypeHandle,
        ) -> *mut ErrorInfo {
            ffi_catch(|| handles::emit(logical_type, LogicalTypeHandle($variant)))
        }
    };
}

simple_logical_type!(LogicalType_String, LogicalType::String);
simple_logical_type!(LogicalType_Map, LogicalType::Map);
simple_logical_type!(LogicalType_List, LogicalType::List);
simple_logical_type!(LogicalType_Enum, LogicalType::Enum);
simple_logical_type!(LogicalType_Date, LogicalType::Date);
simple_logical_type!(LogicalType_Json, LogicalType::Json);
simple_logical_type!(LogicalType_Bson, LogicalType::Bson);
simple_logical_type!(LogicalType_Uuid, LogicalType::Uuid);
simple_logical_type!(LogicalType_Float16, LogicalType::Float16);
simple_logical_type!(LogicalType_Unknown, LogicalType::Unknown);

/// # Safety
///
/// `logical_type` must be a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn LogicalType_Decimal(
    precision: i32,
    scale: i32,
    logical_type: *mut *mut LogicalTypeHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        handles::emit(
            logical_type,
            LogicalTypeHandle(LogicalType::Decimal { scale, precision }),
        )
    })
}

/// # Safety
///
/// `logical_type` must be a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn LogicalType_Time(
    is_adjusted_to_utc: bool,
    time_unit: i32,
    logical_type: *mut *mut LogicalTypeHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let unit = enums::time_unit_to_engine(time_unit)?;
        handles::emit(
            logical_type,
            LogicalTypeHandle(LogicalType::Time {
                is_adjusted_to_u_t_c: is_adjusted_to_utc,
                unit,
            }),
        )
    })
}

/// # Safety
///
/// `logical_type` must be a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn LogicalType_Timestamp(
    is_adjusted_to_utc: bool,
    time_unit: i32,
    logical_type: *mut *mut LogicalTypeHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let unit = enums::time_unit_to_engine(time_unit)?;
        handles::emit(
            logical_type,
            LogicalTypeHandle(LogicalType::Timestamp {
                is_adjusted_to_u_t_c: is_adjusted_to_utc,
                unit,
            }),
        )
    })
}

/// # Safety
///
/// `logical_type` must be a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn LogicalType_Integer(
    bit_width: i32,
    is_signed: bool,
    logical_type: *mut *mut LogicalTypeHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        match bit_width {
            8 | 16 | 32 | 64 => {}
            other => {
                return Err(CoreError::invalid_argument(format!(
                    "{other} is not a valid integer bit width"
                )))
            }
        }
        handles::emit(
            logical_type,
            LogicalTypeHandle(LogicalType::Integer {
                bit_width: bit_width as i8,
                is_signed,
            }),
        )
    })
}

/// The tag of a logical type (see `LogicalTypeId`).
///
/// # Safety
///
/// `logical_type` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn LogicalType_Id(
    logical_type: *const LogicalTypeHandle,
    id: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(logical_type, "logical type")?;
        handles::write(id, enums::logical_type_id_from_engine(&handle.0) as i32)
    })
}

/// Decimal parameters; fails for non-decimal logical types.
///
/// # Safety
///
/// `logical_type` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn LogicalType_DecimalParams(
    logical_type: *const LogicalTypeHandle,
    precision: *mut i32,
    scale: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(logical_type, "logical type")?;
        match handle.0 {
            LogicalType::Decimal {
                precision: p,
                scale: s,
            } => {
                handles::write(precision, p)?;
                handles::write(scale, s)
            }
            _ => Err(CoreError::invalid_argument("logical type is not a decimal")),
        }
    })
}

/// Time/timestamp parameters; fails for other logical types.
///
/// # Safety
///
/// `logical_type` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn LogicalType_TimeParams(
    logical_type: *const LogicalTypeHandle,
    is_adjusted_to_utc: *mut bool,
    time_unit: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(logical_type, "logical type")?;
        match &handle.0 {
            LogicalType::Time {
                is_adjusted_to_u_t_c,
                unit,
            }
            | LogicalType::Timestamp {
                is_adjusted_to_u_t_c,
                unit,
            } => {
                handles::write(is_adjusted_to_utc, *is_adjusted_to_u_t_c)?;
                handles::write(time_unit, enums::time_unit_from_engine(unit) as i32)
            }
            _ => Err(CoreError::invalid_argument(
                "logical type has no time unit",
            )),
        }
    })
}

/// Integer parameters; fails for non-integer logical types.
///
/// # Safety
///
/// `logical_type` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn LogicalType_IntegerParams(
    logical_type: *const LogicalTypeHandle,
    bit_width: *mut i32,
    is_signed: *mut bool,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(logical_type, "logical type")?;
        match handle.0 {
            LogicalType::Integer {
                bit_width: w,
                is_signed: s,
            } => {
                handles::write(bit_width, w as i32)?;
                handles::write(is_signed, s)
            }
            _ => Err(CoreError::invalid_argument(
                "logical type is not an integer",
            )),
        }
    })
}

/// # Safety
///
/// Both arguments must be live handles.
#[no_mangle]
pub unsafe extern "C" fn LogicalType_Equals(
    left: *const LogicalTypeHandle,
    right: *const LogicalTypeHandle,
    equal: *mut bool,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let left = handles::get(left, "logical type")?;
        let right = handles::get(right, "logical type")?;
        handles::write(equal, left.0 == right.0)
    })
}

/// # Safety
///
/// `logical_type` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn LogicalType_Free(logical_type: *mut LogicalTypeHandle) {
    handles::free(logical_type);
}

// ---------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------

/// Builds a primitive schema node. `type_length`, `precision` and `scale`
/// below zero keep the engine defaults; `logical_type` may be null.
///
/// # Safety
///
/// `name` must be NUL-terminated; `logical_type` null or live; `node` a
/// valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn PrimitiveNode_Make(
    name: *const c_char,
    repetition: i32,
    logical_type: *const LogicalTypeHandle,
    physical_type: i32,
    type_length: i32,
    precision: i32,
    scale: i32,
    node: *mut *mut NodeHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let name = strings::str_from(name, "node name")?;
        let physical = enums::physical_type_to_engine(physical_type)?;
        let mut builder = Type::primitive_type_builder(name, physical)
            .with_repetition(enums::repetition_to_engine(repetition)?);
        if !logical_type.is_null() {
            builder = builder.with_logical_type(Some((*logical_type).0.clone()));
        }
        if type_length >= 0 {
            builder = builder.with_length(type_length);
        }
        if precision >= 0 {
            builder = builder.with_precision(precision);
        }
        if scale >= 0 {
            builder = builder.with_scale(scale);
        }
        handles::emit(node, NodeHandle(Arc::new(builder.build()?)))
    })
}

/// Builds a group schema node from child nodes. The children are shared,
/// not consumed; their handles still need their own free.
///
/// # Safety
///
/// `fields` must point to `field_count` live node handles; `name` must be
/// NUL-terminated; `node` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn GroupNode_Make(
    name: *const c_char,
    repetition: i32,
    fields: *const *const NodeHandle,
    field_count: i64,
    logical_type: *const LogicalTypeHandle,
    node: *mut *mut NodeHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let name = strings::str_from(name, "node name")?;
        if field_count < 0 {
            return Err(CoreError::length("field count is negative"));
        }
        let mut children: Vec<TypePtr> = Vec::with_capacity(field_count as usize);
        if field_count > 0 {
            if fields.is_null() {
                return Err(CoreError::invalid_argument("fields is null"));
            }
            for &field in std::slice::from_raw_parts(fields, field_count as usize) {
                let field = handles::get(field, "field node")?;
                children.push(Arc::clone(&field.0));
            }
        }
        let mut builder = Type::group_type_builder(name)
            .with_repetition(enums::repetition_to_engine(repetition)?)
            .with_fields(children);
        if !logical_type.is_null() {
            builder = builder.with_logical_type(Some((*logical_type).0.clone()));
        }
        handles::emit(node, NodeHandle(Arc::new(builder.build()?)))
    })
}

/// Builds the root node of a schema: a group with no repetition.
///
/// # Safety
///
/// Same contract as `GroupNode_Make`.
#[no_mangle]
pub unsafe extern "C" fn RootNode_Make(
    name: *const c_char,
    fields: *const *const NodeHandle,
    field_count: i64,
    node: *mut *mut NodeHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let name = strings::str_from(name, "node name")?;
        if field_count < 0 {
            return Err(CoreError::length("field count is negative"));
        }
        let mut children: Vec<TypePtr> = Vec::with_capacity(field_count as usize);
        if field_count > 0 {
            if fields.is_null() {
                return Err(CoreError::invalid_argument("fields is null"));
            }
            for &field in std::slice::from_raw_parts(fields, field_count as usize) {
                let field = handles::get(field, "field node")?;
                children.push(Arc::clone(&field.0));
            }
        }
        let root = Type::group_type_builder(name).with_fields(children).build()?;
        handles::emit(node, NodeHandle(Arc::new(root)))
    })
}

/// Node name; free with `ParquetString_Free`.
///
/// # Safety
///
/// `node` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn Node_Name(
    node: *const NodeHandle,
    name: *mut *mut c_char,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(node, "node")?;
        handles::write(name, strings::alloc_cstring(handle.0.name())?)
    })
}

/// # Safety
///
/// `node` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn Node_IsGroup(
    node: *const NodeHandle,
    is_group: *mut bool,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(node, "node")?;
        handles::write(is_group, handle.0.is_group())
    })
}

/// # Safety
///
/// `node` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn Node_IsPrimitive(
    node: *const NodeHandle,
    is_primitive: *mut bool,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(node, "node")?;
        handles::write(is_primitive, handle.0.is_primitive())
    })
}

/// Fails for root nodes, which carry no repetition.
///
/// # Safety
///
/// `node` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn Node_Repetition(
    node: *const NodeHandle,
    repetition: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(node, "node")?;
        let info = handle.0.get_basic_info();
        if !info.has_repetition() {
            return Err(CoreError::invalid_argument("the root node has no repetition"));
        }
        handles::write(
            repetition,
            enums::repetition_from_engine(info.repetition()) as i32,
        )
    })
}

/// Logical type of the node, or a null handle when it has none.
///
/// # Safety
///
/// `node` must be a live handle; `logical_type` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn Node_LogicalType(
    node: *const NodeHandle,
    logical_type: *mut *mut LogicalTypeHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(node, "node")?;
        match handle.0.get_basic_info().logical_type() {
            Some(logical) => handles::emit(logical_type, LogicalTypeHandle(logical)),
            None => handles::write(logical_type, std::ptr::null_mut()),
        }
    })
}

/// # Safety
///
/// `node` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn Node_ConvertedType(
    node: *const NodeHandle,
    converted_type: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(node, "node")?;
        handles::write(
            converted_type,
            enums::converted_type_from_engine(handle.0.get_basic_info().converted_type()) as i32,
        )
    })
}

/// Fails for group nodes.
///
/// # Safety
///
/// `node` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn Node_PhysicalType(
    node: *const NodeHandle,
    physical_type: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(node, "node")?;
        if !handle.0.is_primitive() {
            return Err(CoreError::invalid_argument(
                "group nodes have no physical type",
            ));
        }
        handles::write(
            physical_type,
            enums::physical_type_from_engine(handle.0.get_physical_type()) as i32,
        )
    })
}

/// Type length of a fixed-length primitive node; fails for groups.
///
/// # Safety
///
/// `node` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn Node_TypeLength(
    node: *const NodeHandle,
    type_length: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(node, "node")?;
        match handle.0.as_ref() {
            Type::PrimitiveType { type_length: n, .. } => handles::write(type_length, *n),
            Type::GroupType { .. } => Err(CoreError::invalid_argument(
                "group nodes have no type length",
            )),
        }
    })
}

/// Decimal precision of a primitive node; fails for groups.
///
/// # Safety
///
/// `node` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn Node_Precision(
    node: *const NodeHandle,
    precision: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(node, "node")?;
        match handle.0.as_ref() {
            Type::PrimitiveType { precision: p, .. } => handles::write(precision, *p),
            Type::GroupType { .. } => Err(CoreError::invalid_argument(
                "group nodes have no precision",
            )),
        }
    })
}

/// Decimal scale of a primitive node; fails for groups.
///
/// # Safety
///
/// `node` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn Node_Scale(node: *const NodeHandle, scale: *mut i32) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(node, "node")?;
        match handle.0.as_ref() {
            Type::PrimitiveType { scale: s, .. } => handles::write(scale, *s),
            Type::GroupType { .. } => {
                Err(CoreError::invalid_argument("group nodes have no scale"))
            }
        }
    })
}

/// Number of child fields; zero for primitive nodes.
///
/// # Safety
///
/// `node` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn Node_FieldCount(
    node: *const NodeHandle,
    count: *mut i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(node, "node")?;
        let count_value = if handle.0.is_group() {
            handle.0.get_fields().len() as i64
        } else {
            0
        };
        handles::write(count, count_value)
    })
}

/// Child field at `index`; the returned handle shares ownership.
///
/// # Safety
///
/// `node` must be a live handle; `field` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn Node_Field(
    node: *const NodeHandle,
    index: i64,
    field: *mut *mut NodeHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(node, "node")?;
        if !handle.0.is_group() {
            return Err(CoreError::invalid_argument(
                "primitive nodes have no fields",
            ));
        }
        let fields = handle.0.get_fields();
        let index = check_index(index, fields.len())?;
        handles::emit(field, NodeHandle(Arc::clone(&fields[index])))
    })
}

/// # Safety
///
/// Both arguments must be live handles.
#[no_mangle]
pub unsafe extern "C" fn Node_Equals(
    left: *const NodeHandle,
    right: *const NodeHandle,
    equal: *mut bool,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let left = handles::get(left, "node")?;
        let right = handles::get(right, "node")?;
        handles::write(equal, left.0 == right.0)
    })
}

/// # Safety
///
/// `node` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn Node_Free(node: *mut NodeHandle) {
    handles::free(node);
}

// ---------------------------------------------------------------------
// Column paths
// ---------------------------------------------------------------------

/// # Safety
///
/// `parts` must point to `length` NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn ColumnPath_Make(
    parts: *const *const c_char,
    length: i64,
    column_path: *mut *mut ColumnPathHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let parts = strings::str_vec_from(parts, length, "column path part")?;
        handles::emit(column_path, ColumnPathHandle(ColumnPath::new(parts)))
    })
}

/// # Safety
///
/// `dot_string` must be NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn ColumnPath_FromDotString(
    dot_string: *const c_char,
    column_path: *mut *mut ColumnPathHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let dot_string = strings::str_from(dot_string, "dot string")?;
        // The engine's From<&str> treats the whole string as one part;
        // the dotted form has to be split here.
        let parts: Vec<String> = dot_string.split('.').map(str::to_string).collect();
        handles::emit(column_path, ColumnPathHandle(ColumnPath::new(parts)))
    })
}

/// Dot-joined path; free with `ParquetString_Free`.
///
/// # Safety
///
/// `column_path` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnPath_ToDotString(
    column_path: *const ColumnPathHandle,
    dot_string: *mut *mut c_char,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column_path, "column path")?;
        handles::write(dot_string, strings::alloc_cstring(&handle.0.string())?)
    })
}

/// Path parts as an owned string array plus count; free with
/// `ColumnPath_DotVector_Free`.
///
/// # Safety
///
/// `column_path` must be a live handle; both out-pointers valid.
#[no_mangle]
pub unsafe extern "C" fn ColumnPath_ToDotVector(
    column_path: *const ColumnPathHandle,
    parts: *mut *mut *mut c_char,
    length: *mut i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column_path, "column path")?;
        let items: Vec<Option<&str>> = handle.0.parts().iter().map(|p| Some(p.as_str())).collect();
        let array = strings::alloc_string_array(&items)?;
        handles::write(parts, array)?;
        handles::write(length, items.len() as i64)
    })
}

/// # Safety
///
/// `parts`/`length` must come from `ColumnPath_ToDotVector`.
#[no_mangle]
pub unsafe extern "C" fn ColumnPath_DotVector_Free(parts: *mut *mut c_char, length: i64) {
    if length >= 0 {
        strings::free_string_array(parts, length as usize);
    }
}

/// # Safety
///
/// `column_path` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn ColumnPath_Free(column_path: *mut ColumnPathHandle) {
    handles::free(column_path);
}

// ---------------------------------------------------------------------
// Schema and column descriptors
// ---------------------------------------------------------------------

/// Builds a schema descriptor from a root node.
///
/// # Safety
///
/// `root` must be a live node handle; `descriptor` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn SchemaDescriptor_Make(
    root: *const NodeHandle,
    descriptor: *mut *mut SchemaDescriptorHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let root = handles::get(root, "root node")?;
        if !root.0.is_group() {
            return Err(CoreError::invalid_argument(
                "the schema root must be a group node",
            ));
        }
        let descr = SchemaDescriptor::new(Arc::clone(&root.0));
        handles::emit(descriptor, SchemaDescriptorHandle(Arc::new(descr)))
    })
}

/// # Safety
///
/// `descriptor` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn SchemaDescriptor_Name(
    descriptor: *const SchemaDescriptorHandle,
    name: *mut *mut c_char,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(descriptor, "schema descriptor")?;
        handles::write(name, strings::alloc_cstring(handle.0.name())?)
    })
}

/// # Safety
///
/// `descriptor` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn SchemaDescriptor_NumColumns(
    descriptor: *const SchemaDescriptorHandle,
    num_columns: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(descriptor, "schema descriptor")?;
        handles::write(num_columns, handle.0.num_columns() as i32)
    })
}

/// Root group node of the schema; the handle shares ownership.
///
/// # Safety
///
/// `descriptor` must be a live handle; `root` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn SchemaDescriptor_RootNode(
    descriptor: *const SchemaDescriptorHandle,
    root: *mut *mut NodeHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(descriptor, "schema descriptor")?;
        handles::emit(root, NodeHandle(handle.0.root_schema_ptr()))
    })
}

/// Leaf column descriptor at `index`; the handle shares ownership.
///
/// # Safety
///
/// `descriptor` must be a live handle; `column` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn SchemaDescriptor_Column(
    descriptor: *const SchemaDescriptorHandle,
    index: i32,
    column: *mut *mut ColumnDescriptorHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(descriptor, "schema descriptor")?;
        let index = check_index(index as i64, handle.0.num_columns())?;
        handles::emit(column, ColumnDescriptorHandle(handle.0.column(index)))
    })
}

/// # Safety
///
/// `descriptor` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn SchemaDescriptor_Free(descriptor: *mut SchemaDescriptorHandle) {
    handles::free(descriptor);
}

/// # Safety
///
/// `column` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnDescriptor_Name(
    column: *const ColumnDescriptorHandle,
    name: *mut *mut c_char,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column descriptor")?;
        handles::write(name, strings::alloc_cstring(handle.0.name())?)
    })
}

/// # Safety
///
/// `column` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnDescriptor_PathDotString(
    column: *const ColumnDescriptorHandle,
    dot_string: *mut *mut c_char,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column descriptor")?;
        handles::write(
            dot_string,
            strings::alloc_cstring(&handle.0.path().string())?,
        )
    })
}

/// # Safety
///
/// `column` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnDescriptor_MaxDefinitionLevel(
    column: *const ColumnDescriptorHandle,
    level: *mut i16,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column descriptor")?;
        handles::write(level, handle.0.max_def_level())
    })
}

/// # Safety
///
/// `column` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnDescriptor_MaxRepetitionLevel(
    column: *const ColumnDescriptorHandle,
    level: *mut i16,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column descriptor")?;
        handles::write(level, handle.0.max_rep_level())
    })
}

/// # Safety
///
/// `column` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnDescriptor_PhysicalType(
    column: *const ColumnDescriptorHandle,
    physical_type: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column descriptor")?;
        handles::write(
            physical_type,
            enums::physical_type_from_engine(handle.0.physical_type()) as i32,
        )
    })
}

/// Logical type of the column, or a null handle when it has none.
///
/// # Safety
///
/// `column` must be a live handle; `logical_type` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn ColumnDescriptor_LogicalType(
    column: *const ColumnDescriptorHandle,
    logical_type: *mut *mut LogicalTypeHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column descriptor")?;
        match handle.0.self_type().get_basic_info().logical_type() {
            Some(logical) => handles::emit(logical_type, LogicalTypeHandle(logical)),
            None => handles::write(logical_type, std::ptr::null_mut()),
        }
    })
}

/// # Safety
///
/// `column` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnDescriptor_TypeLength(
    column: *const ColumnDescriptorHandle,
    type_length: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column descriptor")?;
        handles::write(type_length, handle.0.type_length())
    })
}

/// # Safety
///
/// `column` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnDescriptor_TypePrecision(
    column: *const ColumnDescriptorHandle,
    precision: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column descriptor")?;
        handles::write(precision, handle.0.type_precision())
    })
}

/// # Safety
///
/// `column` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnDescriptor_TypeScale(
    column: *const ColumnDescriptorHandle,
    scale: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column descriptor")?;
        handles::write(scale, handle.0.type_scale())
    })
}

/// # Safety
///
/// `column` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn ColumnDescriptor_Free(column: *mut ColumnDescriptorHandle) {
    handles::free(column);
}
