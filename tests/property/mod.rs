mod wildcard;
