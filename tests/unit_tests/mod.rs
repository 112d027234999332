mod domain;
mod properties;
mod quadrature;
