/// Implement [`Entity`](crate::entity::Entity) for a struct from its field list.
///
/// Each field is `name: Type`, optionally followed by `=> "Column"` when the column name
/// differs from the field name. Fields are listed in column order; one of them must map
/// to the `Id` key column.
///
/// ```rust
/// use sql_tables::impl_entity;
///
/// #[derive(Debug, Clone, PartialEq)]
/// pub struct Widget {
///     pub id: i64,
///     pub name: String,
/// }
///
/// impl_entity!(Widget {
///     id: i64 => "Id",
///     name: String => "Name",
/// });
/// ```
#[macro_export]
macro_rules! impl_entity {
    (@column $field:ident) => {
        stringify!($field)
    };
    (@column $field:ident $column:literal) => {
        $column
    };
    (
        $entity:ident {
            $( $field:ident : $ty:ty $( => $column:literal )? ),+ $(,)?
        }
    ) => {
        impl $crate::entity::Entity for $entity {
            const TYPE_NAME: &'static str = stringify!($entity);
            const COLUMNS: &'static [$crate::entity::Column] = &[
                $(
                    $crate::entity::Column::new(
                        $crate::impl_entity!(@column $field $( $column )?),
                        <$ty as $crate::entity::ColumnValue>::KIND,
                        <$ty as $crate::entity::ColumnValue>::NULLABLE,
                    ),
                )+
            ];

            fn to_row(&self) -> ::std::vec::Vec<$crate::types::RowValues> {
                ::std::vec![
                    $( $crate::entity::ColumnValue::to_value(&self.$field), )+
                ]
            }

            fn from_row(
                row: &$crate::results::CustomDbRow,
            ) -> ::std::result::Result<Self, $crate::error::StoreError> {
                ::std::result::Result::Ok(Self {
                    $(
                        $field: $crate::entity::column::<$ty>(
                            row,
                            $crate::impl_entity!(@column $field $( $column )?),
                        )?,
                    )+
                })
            }
        }
    };
}
