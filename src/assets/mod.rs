pub mod avatar;
pub mod decode;
pub mod fonts;
