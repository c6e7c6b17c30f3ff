//! The closed set of gateway methods
//!
//! Every method the gateway accepts has exactly one entry in [`METHODS`]:
//! the backend procedure name, the request fields forwarded as positional
//! arguments (in backend order), how a successful result is shaped, and the
//! message shown to the browser when the call fails.

use super::entity::{Association, EntityKind};

use EntityKind::{Category, Image, Product, Supplier};
use ResponseShape::{Ack, Created, Entity, List};

/// How a successful backend result is presented to the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Sequence passed through unchanged under `list`
    List,
    /// New identifier under the entity's id field (`p_id`, ...)
    Created(EntityKind),
    /// Positional row reshaped into a named-field object under the entity name
    Entity(EntityKind),
    /// Opaque acknowledgement under `result`
    Ack,
}

/// One row of the dispatch table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSpec {
    /// Value of the `meth` field; also the backend procedure name
    pub name: &'static str,
    /// Request fields forwarded as positional arguments
    pub params: &'static [&'static str],
    pub shape: ResponseShape,
    /// Fixed message returned to the browser when the call fails
    pub failure: &'static str,
}

const fn spec(
    name: &'static str,
    params: &'static [&'static str],
    shape: ResponseShape,
    failure: &'static str,
) -> MethodSpec {
    MethodSpec {
        name,
        params,
        shape,
        failure,
    }
}

/// All methods understood by the gateway
pub static METHODS: &[MethodSpec] = &[
    // Bulk reads
    spec("products_read", &[], List, "Failed to list products."),
    spec("suppliers_read", &[], List, "Failed to list suppliers."),
    spec("categories_read", &[], List, "Failed to list categories."),
    spec("images_read", &[], List, "Failed to list images."),
    // Product
    spec(
        "product_create",
        &["name", "description", "quantity", "price"],
        Created(Product),
        "Failed to create product.",
    ),
    spec("product_read", &["p_id"], Entity(Product), "Failed to read product."),
    spec(
        "product_update",
        &["p_id", "name", "description", "quantity", "price"],
        Ack,
        "Failed to update product.",
    ),
    spec("product_delete", &["p_id"], Ack, "Failed to delete product."),
    // Supplier
    spec(
        "supplier_create",
        &["name", "contact"],
        Created(Supplier),
        "Failed to create supplier.",
    ),
    spec("supplier_read", &["s_id"], Entity(Supplier), "Failed to read supplier."),
    spec(
        "supplier_update",
        &["s_id", "name", "contact"],
        Ack,
        "Failed to update supplier.",
    ),
    spec("supplier_delete", &["s_id"], Ack, "Failed to delete supplier."),
    // Category
    spec(
        "category_create",
        &["name", "description"],
        Created(Category),
        "Failed to create category.",
    ),
    spec("category_read", &["c_id"], Entity(Category), "Failed to read category."),
    spec(
        "category_update",
        &["c_id", "name", "description"],
        Ack,
        "Failed to update category.",
    ),
    spec("category_delete", &["c_id"], Ack, "Failed to delete category."),
    // Image
    spec("image_create", &["p_id", "url"], Created(Image), "Failed to create image."),
    spec("image_read", &["i_id"], Entity(Image), "Failed to read image."),
    spec(
        "image_update",
        &["i_id", "p_id", "url"],
        Ack,
        "Failed to update image.",
    ),
    spec("image_delete", &["i_id"], Ack, "Failed to delete image."),
    // Supplier <-> product
    spec(
        "supplierProducts_create",
        &["s_id", "p_id"],
        Ack,
        "Failed to associate supplier and product.",
    ),
    spec(
        "supplierProducts_delete",
        &["s_id", "p_id"],
        Ack,
        "Failed to dissociate supplier and product.",
    ),
    spec(
        "supplierProducts_read",
        &["s_id"],
        List,
        "Failed to read supplier products.",
    ),
    // Category <-> product
    spec(
        "categoryProducts_create",
        &["c_id", "p_id"],
        Ack,
        "Failed to associate category and product.",
    ),
    spec(
        "categoryProducts_delete",
        &["c_id", "p_id"],
        Ack,
        "Failed to dissociate category and product.",
    ),
    spec(
        "categoryProducts_read",
        &["c_id"],
        List,
        "Failed to read category products.",
    ),
];

/// Find the table entry for a `meth` value. Names are case-sensitive.
pub fn lookup_method(name: &str) -> Option<&'static MethodSpec> {
    METHODS.iter().find(|m| m.name == name)
}

/// CRUD operation on a single entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrudOp {
    Create,
    Read,
    Update,
    Delete,
}

/// Method name for a CRUD operation, e.g. `product_update`
pub fn crud_method(kind: EntityKind, op: CrudOp) -> &'static str {
    match (kind, op) {
        (Product, CrudOp::Create) => "product_create",
        (Product, CrudOp::Read) => "product_read",
        (Product, CrudOp::Update) => "product_update",
        (Product, CrudOp::Delete) => "product_delete",
        (Supplier, CrudOp::Create) => "supplier_create",
        (Supplier, CrudOp::Read) => "supplier_read",
        (Supplier, CrudOp::Update) => "supplier_update",
        (Supplier, CrudOp::Delete) => "supplier_delete",
        (Category, CrudOp::Create) => "category_create",
        (Category, CrudOp::Read) => "category_read",
        (Category, CrudOp::Update) => "category_update",
        (Category, CrudOp::Delete) => "category_delete",
        (Image, CrudOp::Create) => "image_create",
        (Image, CrudOp::Read) => "image_read",
        (Image, CrudOp::Update) => "image_update",
        (Image, CrudOp::Delete) => "image_delete",
    }
}

/// Method name for the bulk read of an entity, e.g. `categories_read`
pub fn list_method(kind: EntityKind) -> &'static str {
    match kind {
        Product => "products_read",
        Supplier => "suppliers_read",
        Category => "categories_read",
        Image => "images_read",
    }
}

/// Method name for an association operation. `Update` has no association
/// counterpart and maps to `None`.
pub fn association_method(assoc: Association, op: CrudOp) -> Option<&'static str> {
    let name = match (assoc, op) {
        (Association::Supplier, CrudOp::Create) => "supplierProducts_create",
        (Association::Supplier, CrudOp::Read) => "supplierProducts_read",
        (Association::Supplier, CrudOp::Delete) => "supplierProducts_delete",
        (Association::Category, CrudOp::Create) => "categoryProducts_create",
        (Association::Category, CrudOp::Read) => "categoryProducts_read",
        (Association::Category, CrudOp::Delete) => "categoryProducts_delete",
        (_, CrudOp::Update) => return None,
    };
    Some(name)
}
