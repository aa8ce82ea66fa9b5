pub mod keycloak;

pub use keycloak::KeycloakClient;
