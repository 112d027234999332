mod lagrange;
mod univariate;
