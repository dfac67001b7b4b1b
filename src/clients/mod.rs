pub mod oauth;
pub mod soundcloud;
