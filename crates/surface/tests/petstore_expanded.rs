#![allow(clippy::unwrap_used, clippy::expect_used)]

use surface_model::{FieldKind, HttpMethod, Model, Position, TypeKind, TypeRole};
use surface_openapi::Document;

const PETSTORE_EXPANDED: &str = r##"
openapi: "3.0.0"
info:
  version: 1.0.0
  title: Swagger Petstore
paths:
  /pets:
    get:
      description: Returns all pets from the system that the user has access to
      operationId: findPets
      parameters:
        - name: tags
          in: query
          required: false
          schema:
            type: array
            items:
              type: string
        - name: limit
          in: query
          required: false
          schema:
            type: integer
            format: int32
      responses:
        '200':
          description: pet response
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: '#/components/schemas/Pet'
        default:
          $ref: '#/components/responses/Unexpected'
    post:
      summary: Creates a new pet in the store
      operationId: addPet
      requestBody:
        $ref: '#/components/requestBodies/NewPetBody'
      responses:
        '200':
          description: pet response
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pet'
  /pets/{id}:
    parameters:
      - $ref: '#/components/parameters/PetId'
    get:
      operationId: find pet by id
      responses:
        '200':
          description: pet response
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pet'
            application/xml:
              schema:
                $ref: '#/components/schemas/Pet'
    delete:
      responses:
        '204':
          description: pet deleted
components:
  schemas:
    Pet:
      allOf:
        - $ref: '#/components/schemas/NewPet'
        - type: object
          required:
            - id
          properties:
            id:
              type: integer
              format: int64
    NewPet:
      type: object
      required:
        - name
      properties:
        name:
          type: string
        tag:
          type: string
    Error:
      type: object
      properties:
        code:
          type: integer
          format: int32
        message:
          type: string
  parameters:
    PetId:
      name: id
      in: path
      required: true
      schema:
        type: integer
        format: int64
  requestBodies:
    NewPetBody:
      required: true
      content:
        application/json:
          schema:
            $ref: '#/components/schemas/NewPet'
  responses:
    Unexpected:
      description: unexpected error
      content:
        application/json:
          schema:
            $ref: '#/components/schemas/Error'
"##;

fn model() -> Model {
    let document = Document::from_yaml(PETSTORE_EXPANDED).unwrap();
    Model::from_openapi(&document).unwrap()
}

#[test]
fn test_types_are_registered_in_document_order() {
    let model = model();
    let names: Vec<_> = model.types().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "Pet",
            "NewPet",
            "Error",
            "PetId",
            "NewPetBody",
            "findPetsParameters",
            "findPetsResponses",
            "addPetParameters",
            "addPetResponses",
            "findPetByIdParameters",
            "findPetByIdResponses",
            "deletePetsIdParameters",
        ]
    );
}

#[test]
fn test_methods_cover_every_operation() {
    let model = model();
    let methods: Vec<_> = model
        .methods()
        .iter()
        .map(|m| (m.name.as_str(), m.method, m.path.as_str()))
        .collect();
    assert_eq!(
        methods,
        [
            ("findPets", HttpMethod::Get, "/pets"),
            ("addPet", HttpMethod::Post, "/pets"),
            ("findPetById", HttpMethod::Get, "/pets/{id}"),
            ("deletePetsId", HttpMethod::Delete, "/pets/{id}"),
        ]
    );

    let add = &model.methods()[1];
    assert_eq!(add.description, "Creates a new pet in the store");
    let delete = &model.methods()[3];
    assert_eq!(delete.operation, "");
    assert_eq!(delete.responses_type_name, None);
}

#[test]
fn test_all_of_component_collects_properties() {
    let model = model();
    let pet = model.find_type("Pet").unwrap();
    assert_eq!(pet.kind, TypeKind::Struct);
    let fields: Vec<_> = pet
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.type_name.as_str(), f.format.as_deref()))
        .collect();
    assert_eq!(
        fields,
        [
            ("name", "string", None),
            ("tag", "string", None),
            ("id", "integer", Some("int64")),
        ]
    );
}

#[test]
fn test_parameter_types() {
    let model = model();

    let find = model.find_type("findPetsParameters").unwrap();
    assert_eq!(find.role, TypeRole::Parameters);
    assert_eq!(find.fields[0].kind, FieldKind::Array);
    assert_eq!(find.fields[0].position, Some(Position::Query));
    assert_eq!(find.fields[1].format.as_deref(), Some("int32"));

    let by_id = model.find_type("findPetByIdParameters").unwrap();
    assert_eq!(by_id.fields.len(), 1);
    let id = &by_id.fields[0];
    assert_eq!(id.name, "petid");
    assert_eq!(id.kind, FieldKind::Reference);
    assert!(!id.serialize);
    assert_eq!(id.position, Some(Position::Path));
    assert_eq!(model.resolve(&id.type_name).unwrap().fields[0].name, "id");

    let add = model.find_type("addPetParameters").unwrap();
    assert_eq!(add.fields[0].type_name, "NewPetBody");
    assert_eq!(add.fields[0].position, Some(Position::Body));
}

#[test]
fn test_response_types() {
    let model = model();

    let find = model.find_type("findPetsResponses").unwrap();
    assert_eq!(find.role, TypeRole::Responses);
    let fields: Vec<_> = find
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.kind, f.type_name.as_str()))
        .collect();
    assert_eq!(
        fields,
        [
            ("200", FieldKind::Array, "Pet"),
            ("default", FieldKind::Reference, "Error"),
        ]
    );

    // application/xml content is skipped.
    let by_id = model.find_type("findPetByIdResponses").unwrap();
    assert_eq!(by_id.fields.len(), 1);
}

#[test]
fn test_every_reference_resolves() {
    let model = model();
    for t in model.types() {
        for field in t.fields.iter().filter(|f| f.is_reference()) {
            assert!(
                model.resolve(&field.type_name).is_ok(),
                "{}.{} -> {}",
                t.name,
                field.name,
                field.type_name
            );
        }
    }
}
