//! Entity portals
//!
//! A portal is the form-driven view of one entity: which fields the form
//! has, which operations it offers, and how raw form input is checked and
//! converted before it is sent to the gateway. [`PortalClient`] runs those
//! operations through a [`GatewayClient`].

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use ims_core::{
    association_method, crud_method, list_method, Association, Category, CrudOp, EntityKind,
    EntityRecord, Image, Product, Scalar, Supplier,
};
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::client::GatewayClient;
use crate::error::{ClientError, Result};

/// Why form input was rejected
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must be a non-empty string.")]
    Empty(&'static str),

    #[error("{0} must be a non-negative integer.")]
    NotNonNegativeInteger(&'static str),

    #[error("{0} must be a positive number.")]
    NotPositive(&'static str),

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("malformed field '{0}', expected key=value")]
    Malformed(String),
}

/// Input widget for a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Number,
}

/// One field of a portal form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormField {
    pub name: &'static str,
    pub kind: InputKind,
}

const fn text(name: &'static str) -> FormField {
    FormField {
        name,
        kind: InputKind::Text,
    }
}

const fn number(name: &'static str) -> FormField {
    FormField {
        name,
        kind: InputKind::Number,
    }
}

/// Operation a portal offers on an existing record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortalOp {
    View,
    Edit,
    Delete,
    Associate,
    Dissociate,
}

impl fmt::Display for PortalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PortalOp::View => "view",
            PortalOp::Edit => "edit",
            PortalOp::Delete => "delete",
            PortalOp::Associate => "associate",
            PortalOp::Dissociate => "dissociate",
        };
        f.write_str(s)
    }
}

/// Raw form input, as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    values: BTreeMap<String, String>,
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    /// Parse `key=value` pairs such as command-line `--field` arguments
    pub fn from_pairs<I, S>(pairs: I) -> std::result::Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut input = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| ValidationError::Malformed(pair.to_string()))?;
            input.values.insert(key.trim().to_string(), value.to_string());
        }
        Ok(input)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Form-driven view of one entity
pub trait Portal: Send + Sync + 'static {
    const KIND: EntityKind;

    type Record: EntityRecord;

    /// Form fields, in the order the backend expects them
    fn fields() -> &'static [FormField];

    /// Operations offered on an existing record
    fn operations() -> &'static [PortalOp] {
        &[PortalOp::View, PortalOp::Edit, PortalOp::Delete]
    }

    /// Check form input and convert it into envelope fields
    fn validate(input: &FormInput) -> std::result::Result<Map<String, Value>, ValidationError>;
}

fn reject_unknown(
    input: &FormInput,
    fields: &[FormField],
) -> std::result::Result<(), ValidationError> {
    match input.fields().find(|f| !fields.iter().any(|field| field.name == *f)) {
        Some(unknown) => Err(ValidationError::UnknownField(unknown.to_string())),
        None => Ok(()),
    }
}

fn required(input: &FormInput, field: &'static str) -> std::result::Result<Value, ValidationError> {
    match input.get(field).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(Value::String(value.to_string())),
        _ => Err(ValidationError::Empty(field)),
    }
}

/// Absent is null; present must be non-empty
fn optional(input: &FormInput, field: &'static str) -> std::result::Result<Value, ValidationError> {
    match input.get(field) {
        None => Ok(Value::Null),
        Some(_) => required(input, field),
    }
}

fn non_negative_integer(
    input: &FormInput,
    field: &'static str,
) -> std::result::Result<Value, ValidationError> {
    input
        .get(field)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|n| Value::Number(n.into()))
        .ok_or(ValidationError::NotNonNegativeInteger(field))
}

fn positive_number(
    input: &FormInput,
    field: &'static str,
) -> std::result::Result<Value, ValidationError> {
    input
        .get(field)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite() && *n > 0.0)
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or(ValidationError::NotPositive(field))
}

/// Check an identifier typed by the user
pub fn validate_id(kind: EntityKind, id: &str) -> std::result::Result<Value, ValidationError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::Empty(kind.id_field()));
    }
    Ok(Value::String(id.to_string()))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductPortal;
#[derive(Debug, Clone, Copy, Default)]
pub struct SupplierPortal;
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryPortal;
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagePortal;

impl Portal for ProductPortal {
    const KIND: EntityKind = EntityKind::Product;
    type Record = Product;

    fn fields() -> &'static [FormField] {
        const FIELDS: &[FormField] = &[
            text("name"),
            text("description"),
            number("quantity"),
            number("price"),
        ];
        FIELDS
    }

    fn operations() -> &'static [PortalOp] {
        &[
            PortalOp::View,
            PortalOp::Edit,
            PortalOp::Delete,
            PortalOp::Associate,
            PortalOp::Dissociate,
        ]
    }

    fn validate(input: &FormInput) -> std::result::Result<Map<String, Value>, ValidationError> {
        reject_unknown(input, Self::fields())?;
        let mut out = Map::new();
        out.insert("name".into(), required(input, "name")?);
        out.insert("description".into(), optional(input, "description")?);
        out.insert("quantity".into(), non_negative_integer(input, "quantity")?);
        out.insert("price".into(), positive_number(input, "price")?);
        Ok(out)
    }
}

impl Portal for SupplierPortal {
    const KIND: EntityKind = EntityKind::Supplier;
    type Record = Supplier;

    fn fields() -> &'static [FormField] {
        const FIELDS: &[FormField] = &[text("name"), text("contact")];
        FIELDS
    }

    fn validate(input: &FormInput) -> std::result::Result<Map<String, Value>, ValidationError> {
        reject_unknown(input, Self::fields())?;
        let mut out = Map::new();
        out.insert("name".into(), required(input, "name")?);
        out.insert("contact".into(), required(input, "contact")?);
        Ok(out)
    }
}

impl Portal for CategoryPortal {
    const KIND: EntityKind = EntityKind::Category;
    type Record = Category;

    fn fields() -> &'static [FormField] {
        const FIELDS: &[FormField] = &[text("name"), text("description")];
        FIELDS
    }

    fn validate(input: &FormInput) -> std::result::Result<Map<String, Value>, ValidationError> {
        reject_unknown(input, Self::fields())?;
        let mut out = Map::new();
        out.insert("name".into(), required(input, "name")?);
        out.insert("description".into(), optional(input, "description")?);
        Ok(out)
    }
}

impl Portal for ImagePortal {
    const KIND: EntityKind = EntityKind::Image;
    type Record = Image;

    fn fields() -> &'static [FormField] {
        const FIELDS: &[FormField] = &[text("p_id"), text("url")];
        FIELDS
    }

    fn validate(input: &FormInput) -> std::result::Result<Map<String, Value>, ValidationError> {
        reject_unknown(input, Self::fields())?;
        let mut out = Map::new();
        out.insert("p_id".into(), required(input, "p_id")?);
        out.insert("url".into(), required(input, "url")?);
        Ok(out)
    }
}

/// Portals whose records own a product association
pub trait AssociationOwner: Portal {
    const ASSOCIATION: Association;
}

impl AssociationOwner for SupplierPortal {
    const ASSOCIATION: Association = Association::Supplier;
}

impl AssociationOwner for CategoryPortal {
    const ASSOCIATION: Association = Association::Category;
}

/// Runs a portal's operations against the gateway
#[derive(Debug, Clone)]
pub struct PortalClient<P> {
    client: GatewayClient,
    _portal: PhantomData<P>,
}

impl<P: Portal> PortalClient<P> {
    pub fn new(client: GatewayClient) -> Self {
        Self {
            client,
            _portal: PhantomData,
        }
    }

    pub fn gateway(&self) -> &GatewayClient {
        &self.client
    }

    /// Raw rows, exactly as the backend returned them
    pub async fn list_rows(&self) -> Result<Vec<Value>> {
        let body = self.client.call(list_method(P::KIND), Map::new()).await?;
        take_list(body)
    }

    /// Ids of every record; read one with [`read`](Self::read) for its fields
    pub async fn list(&self) -> Result<Vec<Scalar>> {
        self.list_rows()
            .await?
            .into_iter()
            .map(|row| row_id(P::KIND, row))
            .collect()
    }

    /// Create a record from form input and return its new id
    pub async fn create(&self, input: &FormInput) -> Result<Scalar> {
        let fields = P::validate(input)?;
        let mut body = self
            .client
            .call(crud_method(P::KIND, CrudOp::Create), fields)
            .await?;

        let id = body
            .get_mut(P::KIND.id_field())
            .map(Value::take)
            .ok_or_else(|| missing(P::KIND.id_field()))?;
        serde_json::from_value(id).map_err(|e| ClientError::ParseError(e.to_string()))
    }

    pub async fn read(&self, id: &str) -> Result<P::Record> {
        let mut fields = Map::new();
        fields.insert(P::KIND.id_field().into(), validate_id(P::KIND, id)?);

        let mut body = self
            .client
            .call(crud_method(P::KIND, CrudOp::Read), fields)
            .await?;

        let record = body
            .get_mut(P::KIND.name())
            .map(Value::take)
            .ok_or_else(|| missing(P::KIND.name()))?;
        serde_json::from_value(record).map_err(|e| ClientError::ParseError(e.to_string()))
    }

    /// Replace every field of a record; returns the backend's acknowledgement
    pub async fn update(&self, id: &str, input: &FormInput) -> Result<Value> {
        let mut fields = P::validate(input)?;
        fields.insert(P::KIND.id_field().into(), validate_id(P::KIND, id)?);

        let body = self
            .client
            .call(crud_method(P::KIND, CrudOp::Update), fields)
            .await?;
        take_result(body)
    }

    pub async fn delete(&self, id: &str) -> Result<Value> {
        let mut fields = Map::new();
        fields.insert(P::KIND.id_field().into(), validate_id(P::KIND, id)?);

        let body = self
            .client
            .call(crud_method(P::KIND, CrudOp::Delete), fields)
            .await?;
        take_result(body)
    }
}

impl PortalClient<ProductPortal> {
    /// Link a product to a supplier or category
    pub async fn associate(&self, with: Association, owner_id: &str, p_id: &str) -> Result<Value> {
        self.association(with, CrudOp::Create, owner_id, p_id).await
    }

    /// Remove a link created by [`associate`](Self::associate)
    pub async fn dissociate(&self, with: Association, owner_id: &str, p_id: &str) -> Result<Value> {
        self.association(with, CrudOp::Delete, owner_id, p_id).await
    }

    async fn association(
        &self,
        with: Association,
        op: CrudOp,
        owner_id: &str,
        p_id: &str,
    ) -> Result<Value> {
        let meth = association_method(with, op)
            .ok_or_else(|| ClientError::ParseError(format!("no association method for {:?}", op)))?;

        let mut fields = Map::new();
        fields.insert(
            with.owner().id_field().into(),
            validate_id(with.owner(), owner_id)?,
        );
        fields.insert(
            EntityKind::Product.id_field().into(),
            validate_id(EntityKind::Product, p_id)?,
        );

        let body = self.client.call(meth, fields).await?;
        take_result(body)
    }
}

impl<P: AssociationOwner> PortalClient<P> {
    /// Rows of the products linked to one supplier or category
    pub async fn products(&self, id: &str) -> Result<Vec<Value>> {
        let meth = association_method(P::ASSOCIATION, CrudOp::Read)
            .ok_or_else(|| ClientError::ParseError("no association read method".to_string()))?;

        let mut fields = Map::new();
        fields.insert(P::KIND.id_field().into(), validate_id(P::KIND, id)?);

        let body = self.client.call(meth, fields).await?;
        take_list(body)
    }
}

fn missing(field: &str) -> ClientError {
    ClientError::ParseError(format!("response has no '{}' field", field))
}

fn take_list(mut body: Value) -> Result<Vec<Value>> {
    match body.get_mut("list").map(Value::take) {
        Some(Value::Array(rows)) => Ok(rows),
        Some(Value::Null) => Ok(Vec::new()),
        Some(other) => Err(ClientError::ParseError(format!(
            "expected 'list' to be an array, got {}",
            other
        ))),
        None => Err(missing("list")),
    }
}

fn take_result(mut body: Value) -> Result<Value> {
    body.get_mut("result")
        .map(Value::take)
        .ok_or_else(|| missing("result"))
}

/// Id column of a list row
///
/// List reads answer with single-column rows; a bare id is accepted as well.
fn row_id(kind: EntityKind, row: Value) -> Result<Scalar> {
    let id = match row {
        Value::Array(columns) => columns.into_iter().next().ok_or_else(|| {
            ClientError::ParseError(format!("empty row in {} list", kind.name()))
        })?,
        other => other,
    };
    serde_json::from_value(id)
        .map_err(|e| ClientError::ParseError(format!("bad {} id: {}", kind.name(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn product_form() -> FormInput {
        FormInput::new()
            .set("name", "Phone")
            .set("description", "Mobile device")
            .set("quantity", "3")
            .set("price", "34.5")
    }

    #[test]
    fn product_form_converts_numbers() {
        let fields = ProductPortal::validate(&product_form()).unwrap();
        assert_eq!(
            Value::Object(fields),
            json!({
                "name": "Phone",
                "description": "Mobile device",
                "quantity": 3,
                "price": 34.5
            })
        );
    }

    #[test]
    fn product_description_is_optional() {
        let input = FormInput::new()
            .set("name", "Phone")
            .set("quantity", "0")
            .set("price", "1");
        let fields = ProductPortal::validate(&input).unwrap();
        assert_eq!(fields["description"], Value::Null);
        assert_eq!(fields["quantity"], json!(0));
    }

    #[test]
    fn blank_description_is_rejected() {
        let input = product_form().set("description", "  ");
        assert_eq!(
            ProductPortal::validate(&input),
            Err(ValidationError::Empty("description"))
        );
    }

    #[test]
    fn blank_name_is_rejected() {
        let input = product_form().set("name", "");
        let err = ProductPortal::validate(&input).unwrap_err();
        assert_eq!(err.to_string(), "name must be a non-empty string.");
    }

    #[test]
    fn quantity_must_be_non_negative_integer() {
        for bad in ["-1", "2.5", "many", ""] {
            let input = product_form().set("quantity", bad);
            assert_eq!(
                ProductPortal::validate(&input),
                Err(ValidationError::NotNonNegativeInteger("quantity")),
                "quantity {:?}",
                bad
            );
        }
    }

    #[test]
    fn price_must_be_positive() {
        for bad in ["0", "-3", "free", "NaN", "inf"] {
            let input = product_form().set("price", bad);
            let err = ProductPortal::validate(&input).unwrap_err();
            assert_eq!(err.to_string(), "price must be a positive number.", "price {:?}", bad);
        }
    }

    #[test]
    fn unknown_field_is_rejected() {
        let input = product_form().set("colour", "red");
        assert_eq!(
            ProductPortal::validate(&input),
            Err(ValidationError::UnknownField("colour".into()))
        );
    }

    #[test]
    fn supplier_requires_contact() {
        let input = FormInput::new().set("name", "Acme");
        assert_eq!(
            SupplierPortal::validate(&input),
            Err(ValidationError::Empty("contact"))
        );
    }

    #[test]
    fn image_requires_product_and_url() {
        let input = FormInput::new().set("url", "http://img/1.png");
        assert_eq!(
            ImagePortal::validate(&input),
            Err(ValidationError::Empty("p_id"))
        );

        let input = FormInput::new().set("p_id", "7").set("url", "http://img/1.png");
        let fields = ImagePortal::validate(&input).unwrap();
        assert_eq!(Value::Object(fields), json!({"p_id": "7", "url": "http://img/1.png"}));
    }

    #[test]
    fn only_products_offer_associations() {
        assert!(ProductPortal::operations().contains(&PortalOp::Associate));
        assert!(ProductPortal::operations().contains(&PortalOp::Dissociate));
        assert!(!SupplierPortal::operations().contains(&PortalOp::Associate));
        assert_eq!(ImagePortal::operations().len(), 3);
    }

    #[test]
    fn form_fields_match_backend_order() {
        fn names<P: Portal>() -> Vec<&'static str> {
            P::fields().iter().map(|f| f.name).collect()
        }
        assert_eq!(names::<ProductPortal>(), EntityKind::Product.input_fields());
        assert_eq!(names::<SupplierPortal>(), EntityKind::Supplier.input_fields());
        assert_eq!(names::<CategoryPortal>(), EntityKind::Category.input_fields());
        assert_eq!(names::<ImagePortal>(), EntityKind::Image.input_fields());
    }

    #[test]
    fn pairs_are_parsed() {
        let input = FormInput::from_pairs(["name=Acme", "contact=a=b@x.io"]).unwrap();
        assert_eq!(input.get("name"), Some("Acme"));
        assert_eq!(input.get("contact"), Some("a=b@x.io"));

        let err = FormInput::from_pairs(["name"]).unwrap_err();
        assert_eq!(err, ValidationError::Malformed("name".into()));
    }

    #[test]
    fn blank_id_is_rejected() {
        assert_eq!(
            validate_id(EntityKind::Category, " "),
            Err(ValidationError::Empty("c_id"))
        );
    }

    #[test]
    fn list_rows_yield_ids() {
        assert_eq!(
            row_id(EntityKind::Product, json!(["3f2a"])).unwrap(),
            Scalar::from("3f2a")
        );
        assert_eq!(row_id(EntityKind::Supplier, json!([7])).unwrap(), Scalar::Int(7));
        assert_eq!(row_id(EntityKind::Image, json!("i1")).unwrap(), Scalar::from("i1"));

        assert!(row_id(EntityKind::Category, json!([])).is_err());
        assert!(row_id(EntityKind::Category, json!({"c_id": 1})).is_err());
    }
}
