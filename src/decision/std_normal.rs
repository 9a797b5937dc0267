use statrs::function::erf::erfc;

/// Standard normal CDF through the complementary error function, accurate in
/// both tails
pub fn std_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}
