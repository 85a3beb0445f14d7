// Domain 層：模型、介面與地塊解析服務，不做 IO

pub mod basemap;
pub mod model;
pub mod ports;

pub mod services;
